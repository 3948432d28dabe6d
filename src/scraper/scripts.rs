use crate::scraper::config::FeedSelectors;

/// Attribute stamped on each feed child so later scripts can find it again
pub const KEY_ATTRIBUTE: &str = "data-postwatch-key";

/// CSS selector for the feed child stamped with `key`
pub fn node_selector(key: usize) -> String {
    format!("[{KEY_ATTRIBUTE}=\"{key}\"]")
}

/// Quote a value as a JavaScript string literal
fn js_str(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// Generates the JavaScript evaluated in the feed and detail pages
#[derive(Debug, Clone)]
pub struct FeedScripts {
    selectors: FeedSelectors,
}

impl FeedScripts {
    pub fn new(selectors: FeedSelectors) -> Self {
        Self { selectors }
    }

    /// Number of direct children in the feed container (0 when absent)
    pub fn child_count(&self) -> String {
        let feed = js_str(&self.selectors.feed);
        format!(
            r#"
            (() => {{
                const feed = document.querySelector({feed});
                return feed ? feed.children.length : 0;
            }})()
            "#
        )
    }

    /// Stamp every feed child with its position and report its signature
    pub fn tag_children(&self) -> String {
        let feed = js_str(&self.selectors.feed);
        let attr = js_str(KEY_ATTRIBUTE);
        format!(
            r#"
            (() => {{
                const feed = document.querySelector({feed});
                if (!feed) return [];
                return Array.from(feed.children).map((el, i) => {{
                    el.setAttribute({attr}, String(i));
                    return {{
                        key: i,
                        signature: el.tagName.toLowerCase() + '|' + (el.getAttribute('class') || '')
                    }};
                }});
            }})()
            "#
        )
    }

    /// Author and text of one stamped feed child, or null if it is gone
    pub fn read_post(&self, key: usize) -> String {
        let node = js_str(&node_selector(key));
        let author = js_str(&self.selectors.post_author);
        let text = js_str(&self.selectors.post_text);
        format!(
            r#"
            (() => {{
                const root = document.querySelector({node});
                if (!root) return null;
                const first = (selector) => {{
                    for (const el of root.querySelectorAll(selector)) {{
                        const value = (el.innerText || '').trim();
                        if (value.length > 0) return value;
                    }}
                    return '';
                }};
                return {{ author: first({author}), text: first({text}) }};
            }})()
            "#
        )
    }

    /// Text and style of every node under the detail view's time link
    pub fn time_fragments(&self) -> String {
        let link = js_str(&format!(
            "{} {}",
            self.selectors.detail_post, self.selectors.active_link
        ));
        let container = js_str(&self.selectors.time_container);
        format!(
            r#"
            (() => {{
                const link = document.querySelector({link});
                if (!link) return [];
                const parent = link.querySelector({container}) || link;
                return Array.from(parent.querySelectorAll('*')).map(el => ({{
                    text: el.innerText || el.textContent || '',
                    style: el.getAttribute('style')
                }}));
            }})()
            "#
        )
    }

    /// "two_factor", "logged_in" or "pending"
    pub fn login_state(code_prompt_text: &str, main_landmark: &str) -> String {
        let prompt = js_str(code_prompt_text);
        let landmark = js_str(main_landmark);
        format!(
            r#"
            (() => {{
                const body = document.body ? document.body.innerText : '';
                if (body.includes({prompt})) return 'two_factor';
                if (document.querySelector({landmark})) return 'logged_in';
                return 'pending';
            }})()
            "#
        )
    }
}
