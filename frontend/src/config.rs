#[cfg(debug_assertions)]
pub fn simulated_latency_ms(_release_ms: u32) -> u32 {
    300 // Keeps local testing snappy
}

#[cfg(not(debug_assertions))]
pub fn simulated_latency_ms(release_ms: u32) -> u32 {
    release_ms
}

pub const CONSULTATION_LATENCY_MS: u32 = 2000;
pub const QUICK_CONTACT_LATENCY_MS: u32 = 1500;
pub const NEWSLETTER_LATENCY_MS: u32 = 1000;

/// localStorage key holding the consultation form snapshot.
pub const PROGRESS_STORAGE_KEY: &str = "consultationFormProgress";

pub const NOTIFICATION_LIFETIME_MS: u32 = 5000;

/// How long after the last keystroke leaving the page still prompts.
pub const ABANDON_WINDOW_SECS: i64 = 30;

pub const STICKY_HEADER_THRESHOLD_PX: f64 = 50.0;

pub const PROGRESS_BAR_REVEAL_PX: f64 = 100.0;

pub const MOBILE_BREAKPOINT_PX: f64 = 768.0;

pub const SEARCH_DEBOUNCE_MS: u32 = 300;
