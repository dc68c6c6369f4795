//! Interactive drill-down over a headless map surface.
//!
//! Each menu entry is a marker on the map; choosing one clicks its screen
//! position, so the same routing a real map uses drives the terminal.

use cowork_map_cli_utils::{MultiProgress, with_spinner};
use cowork_map_explorer::{Collaborators, Explorer, LoadState, view::DrillView};
use cowork_map_province::registry::ProvinceRegistry;
use cowork_map_selection_models::{SelectionEvent, SelectionState};
use cowork_map_viewport::{ViewportConfig, headless::HeadlessSurface};
use cowork_map_viewport_models::{MarkerVariant, ScreenPoint, ScreenSize};
use dialoguer::Select;

enum Action {
    Click(ScreenPoint),
    Event(SelectionEvent),
    Quit,
}

fn marker_label(title: &str, label: &str, variant: MarkerVariant) -> String {
    match variant {
        MarkerVariant::ProvinceDot => title.to_string(),
        MarkerVariant::CityAggregate => format!("{title} ({label})"),
        MarkerVariant::SelectedPin => format!("* {title} [{label}]"),
        MarkerVariant::LocationPin if label.is_empty() => title.to_string(),
        MarkerVariant::LocationPin => format!("{title} [{label}]"),
    }
}

/// Event that goes back one level from `state`.
fn back_event(state: &SelectionState) -> Option<SelectionEvent> {
    match state {
        SelectionState::None => None,
        SelectionState::Province { province } => Some(SelectionEvent::ClickProvince {
            name: province.clone(),
        }),
        SelectionState::City { city, .. } => Some(SelectionEvent::ClickCity { name: city.clone() }),
        SelectionState::Location { .. } => Some(SelectionEvent::ClosePanel),
    }
}

fn menu(view: &DrillView<HeadlessSurface>) -> Vec<(String, Action)> {
    let session = view.session();
    let mut items: Vec<(String, Action)> = session
        .markers()
        .map(|m| {
            (
                marker_label(&m.title, &m.label, m.variant),
                Action::Click(session.project(m.position)),
            )
        })
        .collect();

    if let Some(event) = back_event(view.state()) {
        items.push(("<- Back".to_string(), Action::Event(event)));
    }
    if !matches!(view.state(), SelectionState::None | SelectionState::Province { .. }) {
        items.push(("<< All provinces".to_string(), Action::Event(SelectionEvent::Reset)));
    }
    items.push(("Quit".to_string(), Action::Quit));
    items
}

fn print_header(view: &DrillView<HeadlessSurface>) -> Result<(), serde_json::Error> {
    let trail: Vec<String> = view.breadcrumb().into_iter().map(|c| c.label).collect();
    println!();
    println!("{}", console::style(trail.join(" > ")).bold());

    if let Some(panel) = view.detail_panel() {
        println!("{}", serde_json::to_string_pretty(&panel)?);
    }
    Ok(())
}

/// Runs the interactive explorer until the user quits.
///
/// # Errors
///
/// * If the map data fails to load
/// * If the terminal prompt fails
pub async fn run(
    multi: &MultiProgress,
    collaborators: Collaborators,
    config: ViewportConfig,
    size: ScreenSize,
) -> Result<(), Box<dyn std::error::Error>> {
    let explorer = Explorer::new(
        HeadlessSurface::new(size),
        ProvinceRegistry::bulgaria(),
        config,
    );

    let state = with_spinner(multi, "Loading map data...", explorer.mount(collaborators)).await;
    if state != LoadState::Ready {
        return Err("map data failed to load; run with RUST_LOG=warn for details".into());
    }

    loop {
        let items = explorer.with_view(|view| print_header(view).map(|()| menu(view)))??;
        let labels: Vec<&str> = items.iter().map(|(label, _)| label.as_str()).collect();

        let idx = Select::new()
            .with_prompt("Select")
            .items(&labels)
            .default(0)
            .interact()?;

        match &items[idx].1 {
            Action::Click(point) => {
                explorer.with_view(|view| view.on_click(*point))?;
            }
            Action::Event(event) => {
                explorer.with_view(|view| view.apply(event))?;
            }
            Action::Quit => break,
        }
    }

    explorer.unmount();
    Ok(())
}
