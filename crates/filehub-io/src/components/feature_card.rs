//! One conversion feature: its drop zone, queue, options, and submit
//! button.
//!
//! The card owns a [`QueueService`] and re-renders through a revision
//! signal bumped by the service's observer. Submissions run as a Dioxus
//! task; unmounting the card cancels the task, which aborts the fetch.

use dioxus::prelude::*;
use filehub_intake::{
    ClientConfig, Direction, Dispatcher, DroppedEntry, Feature, ItemId, QueueService, SubmitMode,
    drag,
};

use crate::components::{DropZone, QueueList};
use crate::download;
use crate::options::CardOptions;
use crate::status::{Status, Tone};
use crate::transport::FetchTransport;

/// How long a status message stays up.
const STATUS_TIMEOUT_MS: u32 = 4_000;

/// Show `next` and clear it after [`STATUS_TIMEOUT_MS`], unless a newer
/// message replaced it first.
fn flash(mut status: Signal<Option<Status>>, mut generation: Signal<u64>, next: Status) {
    generation += 1;
    let mine = *generation.peek();
    status.set(Some(next));
    spawn(async move {
        gloo_timers::future::TimeoutFuture::new(STATUS_TIMEOUT_MS).await;
        if *generation.peek() == mine {
            status.set(None);
        }
    });
}

#[component]
pub fn FeatureCard(feature: Feature, config: ClientConfig) -> Element {
    let mut revision = use_signal(|| 0u64);
    let mut busy = use_signal(|| false);
    let status = use_signal(|| Option::<Status>::None);
    let status_generation = use_signal(|| 0u64);
    let options = use_signal(CardOptions::default);

    let mut service = use_hook(|| {
        let mut service = QueueService::for_feature(feature);
        service.subscribe(move |event, queue| {
            tracing::trace!(?event, len = queue.len(), feature = %feature, "queue changed");
            revision += 1;
        });
        CopyValue::new(service)
    });
    let dispatcher = use_hook(|| Dispatcher::new(FetchTransport, config.clone()));

    let on_drag = move |event: drag::DragEvent| {
        let outcome = service.write().drag(event);
        if let Some(next) = Status::from_entries(outcome.report.as_ref(), &outcome.discarded) {
            flash(status, status_generation, next);
        }
    };

    let on_entries = move |entries: Vec<DroppedEntry>| {
        let outcome = service.write().offer_entries(entries);
        if let Some(next) = Status::from_entries(outcome.report.as_ref(), &outcome.discarded) {
            flash(status, status_generation, next);
        }
    };

    let on_select = move |id: ItemId| {
        if let Err(e) = service.write().select(id) {
            tracing::debug!(error = %e, "stale selection ignored");
        }
    };
    let on_move = move |(id, direction): (ItemId, Direction)| {
        service.write().reorder(id, direction);
    };
    let on_remove = move |id: ItemId| {
        service.write().remove(id);
    };
    let on_clear = move |()| {
        service.write().clear();
    };

    let submit = move |_| {
        let params = match options.read().params(feature) {
            Ok(params) => params,
            Err(e) => return flash(status, status_generation, Status::from(&e)),
        };
        let (endpoint, form) = match feature.request(&params) {
            Ok(request) => request,
            Err(e) => return flash(status, status_generation, Status::from(&e)),
        };
        let pending = match dispatcher.submit(service.read().queue(), &endpoint, form) {
            Ok(pending) => pending,
            Err(e) => return flash(status, status_generation, Status::from(&e)),
        };
        busy.set(true);
        spawn(async move {
            let next = match pending.await {
                Ok(result) => match download::save(&result) {
                    Ok(()) => Status::success(format!("Saved {}", result.filename)),
                    Err(e) => Status::error(format!("Download failed: {e}")),
                },
                Err(e) => Status::from(&e),
            };
            busy.set(false);
            flash(status, status_generation, next);
        });
    };

    // Subscribe to queue changes.
    let _ = revision();
    let (items, selection, drag_active, accept) = {
        let state = service.read();
        (
            state.queue().items().to_vec(),
            state.queue().selection(),
            state.is_drag_active(),
            state.queue().validator().accept_attribute(),
        )
    };
    let selectable = feature.endpoint().mode == SubmitMode::SingleActive && items.len() > 1;
    let multiple = feature.capacity().get() > 1;
    let can_submit = !items.is_empty() && !busy();

    let button_class = if can_submit {
        "w-full px-4 py-2 bg-[var(--btn-primary)] hover:bg-[var(--btn-primary-hover)] rounded text-white font-medium transition-colors cursor-pointer"
    } else {
        "w-full px-4 py-2 bg-[var(--btn-disabled)] rounded text-[var(--text-disabled)] cursor-not-allowed"
    };

    rsx! {
        section { class: "bg-[var(--surface)] rounded-lg p-4 flex flex-col gap-3 border border-[var(--border)]",
            header {
                h3 { class: "text-lg font-semibold text-[var(--text-heading)]", "{feature.title()}" }
                p { class: "text-sm text-[var(--muted)]", "{feature.description()}" }
            }

            DropZone {
                hint: feature.hint(),
                accept,
                multiple,
                active: drag_active,
                on_drag,
                on_entries,
            }

            QueueList {
                items,
                selection,
                selectable,
                on_select,
                on_move,
                on_remove,
                on_clear,
            }

            {render_options(feature, options)}

            button {
                class: button_class,
                disabled: !can_submit,
                onclick: submit,
                if busy() { "Processing..." } else { "{action_label(feature)}" }
            }

            if let Some(ref current) = status() {
                p { class: "text-sm {tone_class(current.tone)}", "{current}" }
            }
        }
    }
}

const fn action_label(feature: Feature) -> &'static str {
    match feature {
        Feature::Compress => "Compress",
        Feature::Ico | Feature::WebpToPng => "Convert",
        Feature::ImagesToPdf => "Create PDF",
        Feature::MergePdf => "Merge",
        Feature::RemovePages => "Remove Pages",
        Feature::PdfPassword => "Apply",
        Feature::Sticker => "Generate Sticker",
    }
}

const fn tone_class(tone: Tone) -> &'static str {
    match tone {
        Tone::Success => "text-[var(--text-success)]",
        Tone::Warning => "text-[var(--text-warning)]",
        Tone::Error => "text-[var(--text-error)]",
    }
}

/// Option fields for features that take them.
fn render_options(feature: Feature, mut options: Signal<CardOptions>) -> Element {
    let input_class = "w-full px-2 py-1 rounded bg-[var(--input-bg)] border border-[var(--border)]";
    let current = options();
    match feature {
        Feature::Compress => rsx! {
            label { class: "text-sm flex flex-col gap-1",
                "Colours (2-256)"
                input {
                    class: input_class,
                    r#type: "number",
                    min: "2",
                    max: "256",
                    value: "{current.colors}",
                    oninput: move |e| options.write().colors = e.value(),
                }
            }
        },
        Feature::RemovePages => rsx! {
            label { class: "text-sm flex flex-col gap-1",
                "Pages to remove"
                input {
                    class: input_class,
                    placeholder: "1, 3, 5-7",
                    value: "{current.pages}",
                    oninput: move |e| options.write().pages = e.value(),
                }
            }
        },
        Feature::PdfPassword => rsx! {
            div { class: "flex gap-4 text-sm",
                label { class: "flex items-center gap-1",
                    input {
                        r#type: "radio",
                        name: "pdf-password-action",
                        checked: !current.unlock,
                        onchange: move |_| options.write().unlock = false,
                    }
                    "Add password"
                }
                label { class: "flex items-center gap-1",
                    input {
                        r#type: "radio",
                        name: "pdf-password-action",
                        checked: current.unlock,
                        onchange: move |_| options.write().unlock = true,
                    }
                    "Remove password"
                }
            }
            input {
                class: input_class,
                r#type: "password",
                placeholder: "Password",
                value: "{current.password}",
                oninput: move |e| options.write().password = e.value(),
            }
            if !current.unlock {
                input {
                    class: input_class,
                    r#type: "password",
                    placeholder: "Confirm password",
                    value: "{current.confirm}",
                    oninput: move |e| options.write().confirm = e.value(),
                }
            }
        },
        Feature::Ico
        | Feature::WebpToPng
        | Feature::ImagesToPdf
        | Feature::MergePdf
        | Feature::Sticker => rsx! {},
    }
}
