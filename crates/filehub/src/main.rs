use dioxus::prelude::*;
use filehub_intake::{ClientConfig, Feature};
use filehub_io::FeatureCard;
use tracing::Level;

/// Conversion API base URL, fixed at build time.
const API_BASE_URL: Option<&str> = option_env!("FILEHUB_API_BASE_URL");

/// Features shown in the image hub.
const IMAGE_HUB: [Feature; 4] = [
    Feature::Compress,
    Feature::Ico,
    Feature::WebpToPng,
    Feature::Sticker,
];

/// Features shown in the PDF hub.
const PDF_HUB: [Feature; 4] = [
    Feature::ImagesToPdf,
    Feature::MergePdf,
    Feature::RemovePages,
    Feature::PdfPassword,
];

fn main() {
    if let Err(e) = dioxus::logger::init(Level::INFO) {
        eprintln!("failed to initialise logger: {e}");
    }
    dioxus::launch(app);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hub {
    Images,
    Pdf,
}

impl Hub {
    const fn label(self) -> &'static str {
        match self {
            Self::Images => "Image Hub",
            Self::Pdf => "PDF Hub",
        }
    }

    const fn features(self) -> [Feature; 4] {
        match self {
            Self::Images => IMAGE_HUB,
            Self::Pdf => PDF_HUB,
        }
    }
}

/// Root application component.
///
/// Switches between the image and PDF hubs; each hub is a grid of
/// independent feature cards sharing one client config.
fn app() -> Element {
    let config = use_hook(|| ClientConfig::from_override(API_BASE_URL));
    let mut hub = use_signal(|| Hub::Images);

    use_hook(|| tracing::info!(api = %config.api_base_url, "filehub started"));

    rsx! {
        document::Script { src: "https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4" }
        style { dangerous_inner_html: include_str!("../assets/theme.css") }

        div { class: "min-h-screen bg-(--bg) text-(--text) flex flex-col",
            header { class: "px-6 py-4 border-b border-(--border) flex items-center justify-between",
                div {
                    h1 { class: "text-2xl font-semibold", "filehub" }
                    p { class: "text-(--muted) text-sm",
                        "Convert, merge, and protect images and PDFs"
                    }
                }
                nav { class: "flex gap-2",
                    for candidate in [Hub::Images, Hub::Pdf] {
                        button {
                            key: "{candidate.label()}",
                            class: if hub() == candidate {
                                "px-3 py-1 rounded bg-[var(--btn-primary)] text-white"
                            } else {
                                "px-3 py-1 rounded bg-[var(--surface)] hover:bg-[var(--surface-active)]"
                            },
                            onclick: move |_| hub.set(candidate),
                            "{candidate.label()}"
                        }
                    }
                }
            }

            main { class: "flex-1 p-6 grid gap-6 md:grid-cols-2 xl:grid-cols-4",
                for feature in hub().features() {
                    FeatureCard {
                        key: "{feature:?}",
                        feature,
                        config: config.clone(),
                    }
                }
            }
        }
    }
}
