use crate::config;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HeaderState {
    pub scrolled: bool,
    pub hidden: bool,
}

/// Tracks scroll direction for the sticky header.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeaderTracker {
    last_y: f64,
}

impl HeaderTracker {
    pub fn on_scroll(&mut self, scroll_y: f64, viewport_width: f64, header_height: f64) -> HeaderState {
        let scrolling_down = scroll_y > self.last_y;
        let mobile = viewport_width <= config::MOBILE_BREAKPOINT_PX;
        self.last_y = scroll_y;
        HeaderState {
            scrolled: scroll_y > config::STICKY_HEADER_THRESHOLD_PX,
            hidden: mobile && scrolling_down && scroll_y > header_height,
        }
    }
}

/// How far down the page the reader is, in percent.
pub fn scroll_progress(scroll_top: f64, scroll_height: f64, client_height: f64) -> f64 {
    let scrollable = scroll_height - client_height;
    if scrollable <= 0.0 {
        return 0.0;
    }
    (scroll_top / scrollable * 100.0).clamp(0.0, 100.0)
}

/// The progress bar stays hidden near the top of the page.
pub fn progress_visible(scroll_top: f64) -> bool {
    scroll_top > config::PROGRESS_BAR_REVEAL_PX
}

fn is_home(path: &str) -> bool {
    path == "/" || path == "./index.html" || path == "index.html" || path.ends_with("/index.html")
}

/// Exact match, home aliases, or a partial match for pages below `href`.
pub fn is_active_link(href: &str, path: &str, hash: &str) -> bool {
    if href == path || href == format!("{}{}", path, hash) {
        return true;
    }
    if is_home(href) {
        return is_home(path);
    }
    let stripped = href.trim_start_matches("./");
    !stripped.is_empty() && path.contains(stripped)
}
