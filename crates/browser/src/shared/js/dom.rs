/// `(kind, value) => Element[]` for css, role and text locators.
pub const RESOLVE: &str = r#"
(kind, value) => {
    if (kind === 'text') {
        const needle = value.toLowerCase();
        const root = document.body || document.documentElement;
        const walker = document.createTreeWalker(root, NodeFilter.SHOW_TEXT);
        const found = [];
        while (walker.nextNode()) {
            const node = walker.currentNode;
            const el = node.parentElement;
            if (!el || ['SCRIPT', 'STYLE', 'TEMPLATE'].includes(el.tagName)) continue;
            if (node.textContent.toLowerCase().includes(needle) && !found.includes(el)) {
                found.push(el);
            }
        }
        return found;
    }
    const selector = kind === 'role' ? '[role="' + value + '"]' : value;
    return Array.from(document.querySelectorAll(selector));
}
"#;

pub const TEXTS: &str = r#"
(els) => els.map(e => (e.textContent || '').replace(/\s+/g, ' ').trim())
"#;

pub const COUNT: &str = r#"
(els) => els.length
"#;

pub const ANY_VISIBLE: &str = r#"
(els) => els.some(el => {
    const rect = el.getBoundingClientRect();
    const style = window.getComputedStyle(el);
    return rect.width > 0 && rect.height > 0 &&
        style.visibility !== 'hidden' && style.display !== 'none';
})
"#;

pub const BODY_TEXT: &str = r#"
() => document.body ? document.body.innerText.replace(/\s+/g, ' ').trim() : ''
"#;
