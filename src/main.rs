use std::path::PathBuf;

use bevy::prelude::*;
use polycube_core::PuzzleKind;
use polycube_view::PolycubeViewPlugin;

fn main() {
    // polycube_studio [blocker|bedlam] [config.json]
    let mut args = std::env::args().skip(1);
    let variant = args.next();
    let config_path = args.next().map(PathBuf::from);

    let kind = variant
        .as_deref()
        .and_then(PuzzleKind::from_name)
        .unwrap_or_default();

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: format!("Polycube Studio - {}", kind.name()),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(PolycubeViewPlugin { kind, config_path })
        .add_systems(Startup, move || {
            if let Some(name) = &variant {
                if PuzzleKind::from_name(name).is_none() {
                    warn!("unknown puzzle '{}', showing {}", name, kind.name());
                }
            }
        })
        .run();
}
