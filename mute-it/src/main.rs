#![cfg_attr(windows, windows_subsystem = "windows")]

use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mute_it=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(windows)]
fn main() -> anyhow::Result<()> {
    init_tracing();

    if let Err(e) = run() {
        tracing::error!(error = ?e, "MuteIt failed to start");
        mute_it::platform::show_error(&format!("{:#}", e));
        return Err(e);
    }
    Ok(())
}

#[cfg(windows)]
fn run() -> anyhow::Result<()> {
    use anyhow::Context;
    use mute_it::audio::{ComGuard, CoreAudioQuery};
    use mute_it::hotkey::global::GlobalHotkeys;
    use mute_it::platform::MessageWindow;
    use mute_it::tray::native::NativeTray;
    use mute_it::{MuteIt, Settings, TrayState};
    use std::sync::mpsc;

    let _com = ComGuard::new().context("COM init failed")?;
    let settings = Settings::default();

    let window = MessageWindow::new().context("Failed to create message window")?;
    let (events_tx, events_rx) = mpsc::channel();

    let tray = NativeTray::new(&TrayState::default()).context("Failed to create tray icon")?;
    tray.forward_events(events_tx.clone(), window.waker());

    let hotkeys = GlobalHotkeys::new();
    hotkeys.forward_events(events_tx, window.waker());

    let mut app = MuteIt::start(
        CoreAudioQuery::new(settings.capture_role),
        tray,
        hotkeys,
        window.timer(),
        &settings,
    )
    .context("App init failed")?;

    let result = window.run(&events_rx, |event| app.handle(event));

    app.shutdown();
    drop(app);

    result.context("Message loop failed")?;
    tracing::info!("MuteIt exited");
    Ok(())
}

#[cfg(not(windows))]
fn main() {
    init_tracing();
    tracing::error!("MuteIt only runs on Windows");
    std::process::exit(1);
}
