//! Ordered list of queued files with move, remove, and select controls.

use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::{LdArrowDown, LdArrowUp, LdTrash2, LdX};
use filehub_intake::{Direction, ItemId, QueueItem, format_size};

/// Props for the [`QueueList`] component.
#[derive(Props, Clone, PartialEq)]
pub struct QueueListProps {
    /// Items in queue order.
    items: Vec<QueueItem>,
    /// Currently selected item, highlighted when `selectable`.
    selection: Option<ItemId>,
    /// Single-active features submit the selected row only.
    selectable: bool,
    on_select: EventHandler<ItemId>,
    on_move: EventHandler<(ItemId, Direction)>,
    on_remove: EventHandler<ItemId>,
    on_clear: EventHandler<()>,
}

#[component]
pub fn QueueList(props: QueueListProps) -> Element {
    if props.items.is_empty() {
        return rsx! {};
    }
    let last = props.items.len() - 1;
    let on_clear = props.on_clear;

    rsx! {
        div { class: "space-y-1",
            div { class: "flex items-center justify-between text-sm text-[var(--muted)]",
                span { "{props.items.len()} queued" }
                button {
                    class: "flex items-center gap-1 hover:text-[var(--text-error)] cursor-pointer",
                    title: "Clear all",
                    onclick: move |_| on_clear.call(()),
                    Icon { width: 14, height: 14, icon: LdTrash2 }
                    "Clear"
                }
            }
            ul { class: "divide-y divide-[var(--border)] border border-[var(--border)] rounded",
                for (index, item) in props.items.iter().enumerate() {
                    {render_row(item, index, last, &props)}
                }
            }
        }
    }
}

/// Render a single queue row.
fn render_row(item: &QueueItem, index: usize, last: usize, props: &QueueListProps) -> Element {
    let id = item.id();
    let selected = props.selectable && props.selection == Some(id);
    let row_class = if selected {
        "bg-[var(--surface-active)] border-l-4 border-[var(--border-accent)]"
    } else {
        "bg-[var(--surface)]"
    };
    let name = item.handle().name().to_owned();
    let size = format_size(item.handle().size());
    let kind = item.kind().label();
    let selectable = props.selectable;
    let (on_select, on_move, on_remove) = (props.on_select, props.on_move, props.on_remove);

    rsx! {
        li {
            key: "{id}",
            class: "flex items-center gap-2 px-3 py-2 {row_class}",
            onclick: move |_| {
                if selectable {
                    on_select.call(id);
                }
            },
            span { class: "text-xs font-mono px-1 rounded bg-[var(--surface-muted)]", "{kind}" }
            span { class: "flex-1 truncate", title: "{name}", "{name}" }
            span { class: "text-xs text-[var(--muted)]", "{size}" }
            button {
                class: "p-1 disabled:opacity-30 cursor-pointer",
                title: "Move up",
                disabled: index == 0,
                onclick: move |evt| {
                    evt.stop_propagation();
                    on_move.call((id, Direction::Up));
                },
                Icon { width: 14, height: 14, icon: LdArrowUp }
            }
            button {
                class: "p-1 disabled:opacity-30 cursor-pointer",
                title: "Move down",
                disabled: index == last,
                onclick: move |evt| {
                    evt.stop_propagation();
                    on_move.call((id, Direction::Down));
                },
                Icon { width: 14, height: 14, icon: LdArrowDown }
            }
            button {
                class: "p-1 hover:text-[var(--text-error)] cursor-pointer",
                title: "Remove",
                onclick: move |evt| {
                    evt.stop_propagation();
                    on_remove.call(id);
                },
                Icon { width: 14, height: 14, icon: LdX }
            }
        }
    }
}
