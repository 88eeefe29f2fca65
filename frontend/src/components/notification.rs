use yew::prelude::*;
use gloo_timers::callback::Timeout;

use crate::config;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationKind {
    fn class(&self) -> &'static str {
        match self {
            NotificationKind::Info => "notification-info",
            NotificationKind::Success => "notification-success",
            NotificationKind::Warning => "notification-warning",
            NotificationKind::Error => "notification-error",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Info, message: message.into() }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Success, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Warning, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Error, message: message.into() }
    }
}

#[derive(Properties, PartialEq)]
pub struct NotificationBannerProps {
    pub notification: Option<Notification>,
    pub on_close: Callback<()>,
}

/// Transient banner in the top-right corner; closes itself after a few seconds.
#[function_component(NotificationBanner)]
pub fn notification_banner(props: &NotificationBannerProps) -> Html {
    {
        let on_close = props.on_close.clone();
        use_effect_with_deps(
            move |notification: &Option<Notification>| {
                let timeout = notification.as_ref().map(|_| {
                    Timeout::new(config::NOTIFICATION_LIFETIME_MS, move || on_close.emit(()))
                });
                move || drop(timeout)
            },
            props.notification.clone(),
        );
    }

    let Some(notification) = props.notification.as_ref() else {
        return html! {};
    };

    let close = {
        let on_close = props.on_close.clone();
        Callback::from(move |_: MouseEvent| on_close.emit(()))
    };

    html! {
        <div class={classes!("notification", "show", notification.kind.class())} role="alert" aria-live="polite">
            <style>
                {r#"
                    .notification {
                        position: fixed;
                        top: 20px;
                        right: 20px;
                        max-width: 400px;
                        padding: 16px;
                        background: #fff;
                        border: 2px solid #000;
                        border-radius: 8px;
                        box-shadow: 0 10px 25px rgba(0, 0, 0, 0.1);
                        z-index: 10000;
                    }
                    .notification-success { border-color: #22C55E; }
                    .notification-error { border-color: #EF4444; }
                    .notification-warning { border-color: #F59E0B; }
                    .notification-content {
                        display: flex;
                        align-items: center;
                        justify-content: space-between;
                        gap: 12px;
                    }
                    .notification-message {
                        flex: 1;
                        font-weight: 600;
                    }
                    .notification-close {
                        background: none;
                        border: none;
                        font-size: 20px;
                        cursor: pointer;
                    }
                    @media (max-width: 480px) {
                        .notification {
                            top: 10px;
                            right: 10px;
                            left: 10px;
                            max-width: none;
                        }
                    }
                "#}
            </style>
            <div class="notification-content">
                <span class="notification-message">{&notification.message}</span>
                <button type="button" class="notification-close" aria-label="Close notification" onclick={close}>{"×"}</button>
            </div>
        </div>
    }
}
