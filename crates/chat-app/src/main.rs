use gpui::*;
use gpui_component::{Root, ThemeRegistry};
use tracing_subscriber::EnvFilter;

use socrates::app::{APP_TITLE, ChatAppShell, Quit, default_themes_path, min_window_height};
use socrates::settings::SettingsStore;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let app = Application::new().with_assets(gpui_component_assets::Assets);

    app.run(|cx| {
        gpui_tokio_bridge::init(cx);
        gpui_component::init(cx);

        let store = SettingsStore::load();
        tracing::info!(config_path = %store.config_path().display(), "loaded settings");

        let watch_store = store.clone();
        if let Err(err) = ThemeRegistry::watch_dir(default_themes_path(), cx, move |cx| {
            watch_store.reload().apply_theme(None, cx);
            tracing::info!("theme directory reloaded");
        }) {
            tracing::warn!("failed to watch themes directory: {err}. Using default themes.");
            store.settings().apply_theme(None, cx);
        }

        cx.on_action(|_: &Quit, cx| {
            cx.quit();
        });
        cx.bind_keys([
            KeyBinding::new("cmd-q", Quit, None),
            KeyBinding::new("ctrl-q", Quit, None),
        ]);

        cx.spawn(async move |cx| {
            cx.update(|cx| {
                let options = WindowOptions {
                    window_bounds: Some(WindowBounds::Windowed(Bounds::centered(
                        None,
                        size(px(960.), px(760.)),
                        cx,
                    ))),
                    window_min_size: Some(size(px(480.), px(min_window_height()))),
                    titlebar: Some(TitlebarOptions {
                        title: Some(APP_TITLE.into()),
                        ..Default::default()
                    }),
                    ..Default::default()
                };

                let opened = cx.open_window(options, |window, cx| {
                    let shell = cx.new(|cx| ChatAppShell::new(store, window, cx));
                    cx.new(|cx| Root::new(shell, window, cx))
                });

                match opened {
                    Ok(_) => cx.activate(true),
                    Err(err) => {
                        tracing::error!("failed to open main window: {err}");
                        cx.quit();
                    }
                }
            })
        })
        .detach();
    });
}
