//! Injected enumeration script.
//!
//! Runs inside the page and returns an array of candidate rows in
//! priority order: buttons (including ARIA button roles), then links,
//! then text-input-like elements. Each emitted element is tagged with a
//! scan-scoped `data-uitrail-id` attribute; the returned locator is the
//! attribute selector, which resolves to exactly one element until the
//! next scan re-tags the page. Per-element failures (detached nodes,
//! hostile getters) are swallowed so a single bad element never kills
//! the scan.

pub const SCAN_SCRIPT: &str = r#"(() => {
  const MAX = __MAX_ACTIONS__;
  const out = [];
  const visible = (el) => {
    const rect = el.getBoundingClientRect();
    const style = window.getComputedStyle(el);
    return rect.width > 0 && rect.height > 0
      && style.display !== 'none' && style.visibility !== 'hidden';
  };
  const textOf = (el) =>
    (el.innerText || el.textContent || '').trim().replace(/\s+/g, ' ').slice(0, 80);
  const tag = (el, id) => {
    el.setAttribute('data-uitrail-id', id);
    return '[data-uitrail-id="' + id + '"]';
  };
  const push = (el, kind, id, description) => {
    if (out.length >= MAX) return;
    out.push({ id: id, kind: kind, locator: tag(el, id), description: description });
  };
  const refText = (el, attr) => {
    const refs = el.getAttribute(attr);
    if (!refs) return '';
    return refs.split(/\s+/)
      .map((ref) => { const n = document.getElementById(ref); return n ? textOf(n) : ''; })
      .join(' ').trim();
  };
  const hintFor = (el) => {
    if (el.id) {
      const label = document.querySelector('label[for="' + CSS.escape(el.id) + '"]');
      if (label) { const t = textOf(label); if (t) return t; }
    }
    const aria = (el.getAttribute('aria-label') || '').trim();
    if (aria) return aria;
    const labelled = refText(el, 'aria-labelledby');
    if (labelled) return labelled;
    const placeholder = (el.getAttribute('placeholder') || '').trim();
    if (placeholder) return placeholder;
    const described = refText(el, 'aria-describedby');
    if (described) return described;
    let node = el.parentElement;
    let depth = 0;
    while (node && depth < 4) {
      const t = textOf(node);
      if (t) return t;
      node = node.parentElement;
      depth += 1;
    }
    return '';
  };

  let buttons = 0;
  document.querySelectorAll('button, [role="button"]').forEach((el) => {
    try {
      if (!visible(el)) return;
      const text = textOf(el);
      const description = text ? "button with text '" + text + "'" : 'button index ' + buttons;
      push(el, 'click', 'btn_' + buttons, description);
      buttons += 1;
    } catch (err) { /* skip detached or hostile element */ }
  });

  let links = 0;
  document.querySelectorAll('a[href]').forEach((el) => {
    try {
      if (!visible(el)) return;
      const text = textOf(el);
      const description = text ? "link with text '" + text + "'" : 'link index ' + links;
      push(el, 'click', 'link_' + links, description);
      links += 1;
    } catch (err) { /* skip */ }
  });

  let inputs = 0;
  const inputSelector = [
    'input:not([type])', 'input[type="text"]', 'input[type="search"]',
    'input[type="email"]', 'input[type="url"]', 'input[type="password"]',
    'input[type="number"]', 'input[type="tel"]', 'textarea',
    '[contenteditable=""]', '[contenteditable="true"]'
  ].join(', ');
  document.querySelectorAll(inputSelector).forEach((el) => {
    try {
      if (!visible(el)) return;
      const hint = hintFor(el);
      const description = hint ? "input for '" + hint + "'" : 'input index ' + inputs;
      push(el, 'type', 'input_' + inputs, description);
      inputs += 1;
    } catch (err) { /* skip */ }
  });

  return out;
})()"#;

/// Substitute the candidate cap into the script.
pub fn render_scan_script(max_actions: usize) -> String {
    SCAN_SCRIPT.replace("__MAX_ACTIONS__", &max_actions.to_string())
}
