//! Drop target with a file picker button.

use dioxus::html::{FileData, HasFileData};
use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::LdUpload;
use filehub_intake::{DroppedEntry, drag};

use crate::intake;

/// Props for the [`DropZone`] component.
#[derive(Props, Clone, PartialEq)]
pub struct DropZoneProps {
    /// Accepted formats, shown under the prompt.
    hint: &'static str,
    /// Value for the picker's `accept` attribute.
    accept: String,
    /// Let the picker select several files.
    multiple: bool,
    /// Highlight while a drag hovers.
    active: bool,
    /// Normalized drag events. A drop arrives empty; its files follow
    /// through `on_entries` once read.
    on_drag: EventHandler<drag::DragEvent>,
    /// Entries read from a drop or the picker.
    on_entries: EventHandler<Vec<DroppedEntry>>,
}

/// A dashed drop area. Files from a drop or the picker are read in
/// full and passed up; admission is decided by the card's queue.
#[component]
pub fn DropZone(props: DropZoneProps) -> Element {
    let on_drag = props.on_drag;
    let on_entries = props.on_entries;

    let read_and_offer = move |files: Vec<FileData>| {
        if files.is_empty() {
            return;
        }
        spawn(async move {
            on_entries.call(intake::read_entries(files).await);
        });
    };

    let handle_drop = move |evt: DragEvent| {
        evt.prevent_default();
        // The drag ends now, not when the read finishes.
        on_drag.call(drag::DragEvent::Drop(Vec::new()));
        read_and_offer(evt.files());
    };

    let handle_files = move |evt: FormEvent| read_and_offer(evt.files());

    let border_class = if props.active {
        "border-[var(--border-accent)] bg-[var(--surface-active)]"
    } else {
        "border-[var(--border-muted)] bg-[var(--surface)]"
    };

    rsx! {
        div {
            class: "border-2 border-dashed rounded-lg p-6 text-center transition-colors {border_class}",
            ondragenter: move |evt| {
                evt.prevent_default();
                on_drag.call(drag::DragEvent::Enter);
            },
            ondragover: move |evt| {
                evt.prevent_default();
                on_drag.call(drag::DragEvent::Over);
            },
            ondragleave: move |_| {
                on_drag.call(drag::DragEvent::Leave);
            },
            ondrop: handle_drop,

            div { class: "flex justify-center mb-2 text-[var(--text-secondary)]",
                Icon { width: 28, height: 28, icon: LdUpload }
            }

            p { class: "text-[var(--text-secondary)] mb-3",
                if props.active { "Release to add" } else { "Drop files here or " }
            }

            label {
                class: "inline-block px-4 py-2 bg-[var(--btn-primary)] hover:bg-[var(--btn-primary-hover)] rounded cursor-pointer text-white font-medium transition-colors",
                input {
                    r#type: "file",
                    accept: "{props.accept}",
                    multiple: props.multiple,
                    class: "hidden",
                    onchange: handle_files,
                }
                if props.multiple { "Choose Files" } else { "Choose File" }
            }

            p { class: "text-[var(--muted)] text-sm mt-2", "{props.hint}" }
        }
    }
}
