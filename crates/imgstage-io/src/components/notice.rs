//! Error notice that dismisses itself after a timeout.

use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::LdX;

/// Props for the [`Notice`] component.
#[derive(Props, Clone, PartialEq)]
pub struct NoticeProps {
    /// Text shown to the user.
    message: String,
    /// Milliseconds before `on_dismiss` fires on its own.
    timeout_ms: u32,
    /// Called when the timer runs out or the user closes the notice.
    on_dismiss: EventHandler<()>,
}

/// An inline alert with a close button.
///
/// The timer starts on mount. Give each new message a fresh `key` so a
/// repeated error restarts it instead of inheriting the old deadline.
#[component]
pub fn Notice(props: NoticeProps) -> Element {
    let on_dismiss = props.on_dismiss;
    let timeout_ms = props.timeout_ms;

    // Dropped with the component, so an unmounted notice never fires.
    use_hook(move || {
        spawn(async move {
            gloo_timers::future::TimeoutFuture::new(timeout_ms).await;
            on_dismiss.call(());
        })
    });

    rsx! {
        div {
            role: "alert",
            class: "flex items-start gap-2 px-3 py-2 rounded text-sm bg-[var(--surface)] border border-[var(--border-error)] text-[var(--text-error)]",
            span { class: "flex-1", "{props.message}" }
            button {
                r#type: "button",
                aria_label: "Dismiss",
                class: "shrink-0 hover:opacity-75 transition-opacity",
                onclick: move |_| on_dismiss.call(()),
                Icon { icon: LdX, width: 14, height: 14 }
            }
        }
    }
}
