//! Header image field for edit pages: preview, then upload or cancel.

use std::rc::Rc;

use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::{LdCamera, LdCheck, LdX};
use imgstage_core::{
    Action, Effect, ImageReference, InitialImage, Phase, ReadError, StagedFile, StagerConfig,
    UploadStageState, ValidationError, messages, reduce,
};

use super::Notice;
use crate::browser::BlobUrlReader;
use crate::field::FieldBinder;
use crate::reader::FileReader;
use crate::transport::UploadTransport;

/// A form field held in a signal, as the component binds it.
impl FieldBinder for Signal<String> {
    fn value(&self) -> String {
        self.peek().clone()
    }

    fn on_change(&mut self, value: String) {
        self.set(value);
    }
}

/// Shared upload transport handed to the component.
///
/// Compares by identity so props stay stable across re-renders.
#[derive(Clone)]
pub struct TransportHandle(pub Rc<dyn UploadTransport>);

impl TransportHandle {
    /// Wrap a transport.
    pub fn new(transport: impl UploadTransport + 'static) -> Self {
        Self(Rc::new(transport))
    }
}

impl PartialEq for TransportHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Props for the [`EditPageHeaderImage`] component.
#[derive(Props, Clone, PartialEq)]
pub struct EditPageHeaderImageProps {
    /// DOM id of the file input.
    #[props(into)]
    id: String,
    /// Alt text of the shown image.
    #[props(default = "Header image".to_owned(), into)]
    alt: String,
    /// Extra classes for the outer container.
    #[props(default, into)]
    class: String,
    /// URL of the image already stored for this field.
    #[props(default)]
    initial_preview_src: Option<String>,
    /// The form field receiving the committed key.
    field: Signal<String>,
    /// Where confirmed files are uploaded.
    transport: TransportHandle,
    #[props(default)]
    config: StagerConfig,
    /// Called after each committed upload.
    #[props(default)]
    on_success: Option<EventHandler<ImageReference>>,
    /// Receives the field's validation result whenever it changes.
    #[props(default)]
    validation: Option<Signal<Option<ValidationError>>>,
}

/// Performs reducer effects for one mounted component.
#[derive(Clone)]
struct Driver {
    state: Signal<UploadStageState>,
    field: Signal<String>,
    reader: Rc<BlobUrlReader>,
    transport: Rc<dyn UploadTransport>,
    on_success: Option<EventHandler<ImageReference>>,
}

impl Driver {
    fn dispatch(&self, action: Action) {
        let mut state = self.state;
        let result = reduce(&mut state.write(), action);
        match result {
            Ok(effects) => self.perform(effects),
            Err(e) => tracing::warn!("action rejected: {e}"),
        }
    }

    fn perform(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Read { token, file } => {
                    let driver = self.clone();
                    spawn(async move {
                        let read = driver.reader.read(&file).await;
                        let outcome = match read {
                            Ok(preview_url) => Action::ReadSucceeded {
                                token,
                                file,
                                preview_url,
                            },
                            Err(error) => {
                                tracing::debug!(file = file.name(), "read failed: {error:?}");
                                Action::ReadFailed { token, error }
                            }
                        };
                        driver.dispatch(outcome);
                    });
                }
                Effect::Upload { attempt, file } => {
                    let driver = self.clone();
                    spawn(async move {
                        let uploaded = driver.transport.upload(&file).await;
                        let outcome = match uploaded {
                            Ok(reference) => Action::UploadSucceeded { attempt, reference },
                            Err(e) => {
                                tracing::warn!(attempt, "upload failed: {e}");
                                Action::UploadFailed {
                                    attempt,
                                    message: e.to_string(),
                                }
                            }
                        };
                        driver.dispatch(outcome);
                    });
                }
                Effect::SetField(value) => {
                    let mut field = self.field;
                    field.on_change(value);
                }
                Effect::Release(preview_url) => self.reader.release(&preview_url),
                Effect::Committed(reference) => {
                    tracing::info!(key = %reference.key, "upload committed");
                    if let Some(handler) = self.on_success {
                        handler.call(reference);
                    }
                }
            }
        }
    }
}

/// The header image of an edit page.
///
/// Shows the stored image (or a placeholder) with a camera button over
/// it. Picking a file previews it locally; the user then uploads it or
/// cancels back to the stored image. The bound `field` only ever holds
/// the key of a committed upload, and `validation` reports
/// [`ValidationError::UploadPending`] while a choice is outstanding.
#[component]
pub fn EditPageHeaderImage(props: EditPageHeaderImageProps) -> Element {
    let field = props.field;
    let config = props.config.clone();

    let state = use_signal(|| {
        let current = field.peek().clone();
        UploadStageState::new(InitialImage {
            url: props.initial_preview_src.clone(),
            key: (!current.is_empty()).then_some(current),
        })
    });
    let reader = use_hook(|| Rc::new(BlobUrlReader::new(config.clone())));

    // Incremented per pick so a slow byte read from an older pick is
    // dropped before it reaches the reducer.
    let mut picks = use_signal(|| 0_u64);

    let driver = Driver {
        state,
        field,
        reader: Rc::clone(&reader),
        transport: Rc::clone(&props.transport.0),
        on_success: props.on_success,
    };

    // Release a still-staged preview when the component goes away.
    {
        let reader = Rc::clone(&reader);
        use_drop(move || {
            if let Some(staged) = state.peek().staged() {
                reader.release(&staged.preview_url);
            }
        });
    }

    let validation = props.validation;
    use_effect(move || {
        let result = state.read().validate().err();
        if let Some(mut sink) = validation {
            sink.set(result);
        }
    });

    let handle_files = {
        let driver = driver.clone();
        move |evt: FormEvent| {
            let driver = driver.clone();
            async move {
                picks += 1;
                let my_pick = *picks.peek();
                let selection = driver.state.peek().selection();

                let Some(file) = evt.files().into_iter().next() else {
                    driver.dispatch(Action::Select(None));
                    return;
                };
                let name = file.name();
                let bytes = file.read_bytes().await;

                if *picks.peek() != my_pick || driver.state.peek().selection() != selection {
                    tracing::debug!(file = %name, "dropping bytes of a superseded pick");
                    return;
                }

                match bytes {
                    Ok(bytes) => {
                        driver.dispatch(Action::Select(Some(StagedFile::new(name, bytes.to_vec()))));
                    }
                    Err(e) => {
                        driver.dispatch(Action::SelectFailed(ReadError::Unreadable {
                            detail: e.to_string(),
                        }));
                    }
                }
            }
        }
    };

    let on_confirm = {
        let driver = driver.clone();
        move |_: MouseEvent| driver.dispatch(Action::Confirm)
    };
    let on_cancel = {
        let driver = driver.clone();
        move |_: MouseEvent| driver.dispatch(Action::Cancel)
    };
    let dismiss_read = {
        let driver = driver.clone();
        move |()| driver.dispatch(Action::DismissReadError)
    };
    let dismiss_upload = move |()| driver.dispatch(Action::DismissUploadError);

    let snapshot = state.read();
    let src = snapshot.display_url(config.placeholder()).to_owned();
    let can_confirm = snapshot.can_confirm();
    let can_cancel = snapshot.can_cancel();
    let uploading = snapshot.phase() == Phase::Uploading;
    let read_error = snapshot
        .read_error()
        .map(|e| (snapshot.selection().get(), e.to_string()));
    let upload_error = snapshot
        .upload_error()
        .map(|e| (snapshot.attempts(), e.to_owned()));
    drop(snapshot);

    let accept = config.accept_attribute();
    let timeout_ms = config.notice_timeout_ms;
    let input_id = props.id.clone();

    rsx! {
        div { class: "flex flex-col gap-2 {props.class}",
            div { class: "relative w-full aspect-[3/1] overflow-hidden rounded-lg bg-[var(--surface)]",
                img {
                    class: "w-full h-full object-cover",
                    src: "{src}",
                    alt: "{props.alt}",
                }

                if uploading {
                    div { class: "absolute inset-0 flex items-center justify-center bg-black/40 pointer-events-none",
                        div {
                            role: "status",
                            aria_label: "Uploading",
                            class: "w-8 h-8 border-4 border-white/40 border-t-white rounded-full animate-spin",
                        }
                    }
                }

                // Stays mounted while uploading so a newer file can be picked.
                label {
                    r#for: "{input_id}",
                    aria_label: messages::SELECT_AN_IMAGE,
                    title: messages::SELECT_AN_IMAGE,
                    class: "absolute bottom-3 right-3 p-2 rounded-full bg-black/50 hover:bg-black/70 text-white cursor-pointer transition-colors",
                    Icon { icon: LdCamera, width: 20, height: 20 }
                }
                input {
                    id: "{input_id}",
                    r#type: "file",
                    accept: "{accept}",
                    class: "hidden",
                    onchange: handle_files,
                }
            }

            if can_confirm || can_cancel {
                div { class: "flex gap-2 justify-end",
                    if can_confirm {
                        button {
                            r#type: "button",
                            aria_label: messages::CONFIRM_UPLOAD,
                            class: "inline-flex items-center gap-1 px-3 py-1.5 rounded bg-[var(--btn-primary)] hover:bg-[var(--btn-primary-hover)] text-white font-medium transition-colors",
                            onclick: on_confirm,
                            Icon { icon: LdCheck, width: 16, height: 16 }
                            {messages::UPLOAD}
                        }
                    }
                    if can_cancel {
                        button {
                            r#type: "button",
                            aria_label: messages::CANCEL_UPLOAD,
                            class: "inline-flex items-center gap-1 px-3 py-1.5 rounded border border-[var(--border-muted)] hover:bg-[var(--surface-active)] transition-colors",
                            onclick: on_cancel,
                            Icon { icon: LdX, width: 16, height: 16 }
                            {messages::CANCEL}
                        }
                    }
                }
            }

            if let Some((token, message)) = read_error {
                Notice {
                    key: "read-{token}",
                    message,
                    timeout_ms,
                    on_dismiss: dismiss_read,
                }
            }

            if let Some((attempt, message)) = upload_error {
                Notice {
                    key: "upload-{attempt}",
                    message,
                    timeout_ms,
                    on_dismiss: dismiss_upload,
                }
            }
        }
    }
}
