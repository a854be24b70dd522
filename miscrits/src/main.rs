use std::cell::RefCell;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::Terminal;
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventOutcome, RenderContext, TaskKey,
};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{DebugRunOutput, DebugSession, DebugSessionError, ReplayItem};

use miscrits::action::Action;
use miscrits::api::{self, DatasetLocations};
use miscrits::config::{Args, RuntimeConfig};
use miscrits::effect::Effect;
use miscrits::encoder::Encoder;
use miscrits::moves::export;
use miscrits::patch::{self, PatchRequest};
use miscrits::reducer::reducer;
use miscrits::state::AppState;
use miscrits::{logging, ui};

/// What effect handlers need besides the action they answer.
#[derive(Clone, Debug)]
struct EffectEnv {
    config: RuntimeConfig,
    encoder: Encoder,
    workdir: PathBuf,
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    let config = RuntimeConfig::from_args(&args);
    let log_path = logging::init(&config.log_dir)?;
    tracing::info!(log = %log_path.display(), json_url = %config.json_url, "starting");

    let debug = DebugSession::new(args.debug);

    // Resized uploads and encoder output live here for the whole session.
    let workdir = tempfile::tempdir()?;
    let env = EffectEnv {
        encoder: Encoder::new(&config.godot_bin, &config.encode_script),
        workdir: workdir.path().to_path_buf(),
        config,
    };

    let state = debug
        .load_state_or_else_async(|| async { Ok::<AppState, io::Error>(AppState::default()) })
        .await
        .map_err(debug_error)?;

    let replay_actions = debug.load_replay_items().map_err(debug_error)?;
    let (middleware, recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &debug, store, replay_actions, env).await;

    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug.save_actions(recorder.as_ref()).map_err(debug_error)?;
    tracing::info!("exiting");
    Ok(())
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    replay_actions: Vec<ReplayItem<Action>>,
    env: EffectEnv,
) -> io::Result<DebugRunOutput<AppState>> {
    let env = Arc::new(env);
    let ui = RefCell::new(ui::MiscritsUi::new());
    debug
        .run_effect_app(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::Init),
            Some(Action::Quit),
            |runtime| {
                if debug.render_once() {
                    return;
                }
                runtime
                    .subscriptions()
                    .interval("tick", Duration::from_millis(150), || Action::Tick);
            },
            |frame, area, state, render_ctx: RenderContext| {
                ui.borrow_mut().render(frame, area, state, render_ctx);
            },
            |event, state| -> EventOutcome<Action> { ui::handle_event(event, state) },
            |action| matches!(action, Action::Quit),
            move |effect, ctx| handle_effect(effect, ctx, env.clone()),
        )
        .await
}

fn handle_effect(effect: Effect, ctx: &mut EffectContext<Action>, env: Arc<EffectEnv>) {
    match effect {
        Effect::LoadCatalog => {
            let url = env.config.json_url.clone();
            ctx.tasks().spawn(TaskKey::new("catalog"), async move {
                match api::load_catalog(&url).await {
                    Ok(entries) => Action::CatalogDidLoad(entries),
                    Err(error) => {
                        tracing::warn!(%error, "catalog load failed");
                        Action::CatalogDidError(error)
                    }
                }
            });
        }
        Effect::LoadBosses => {
            let path = env.config.bosses_path.clone();
            ctx.tasks().spawn(TaskKey::new("bosses"), async move {
                match api::load_bosses(&path).await {
                    Ok(bosses) => Action::BossesDidLoad(bosses),
                    Err(error) => Action::BossesDidError(error),
                }
            });
        }
        Effect::LoadSpriteInfo { urls } => {
            ctx.tasks().spawn(TaskKey::new("sprite_info"), async move {
                Action::SpriteInfoDidLoad(api::fetch_sprite_infos(&urls).await)
            });
        }
        Effect::CheckEncoder => {
            let encoder = env.encoder.clone();
            ctx.tasks().spawn(TaskKey::new("encoder_check"), async move {
                let result = encoder.check().err().map(|error| error.to_string());
                if let Some(error) = &result {
                    tracing::warn!(%error, "encoder unavailable");
                }
                Action::EncoderDidCheck(result)
            });
        }
        Effect::EncodePatch {
            name,
            mode,
            upload_path,
            plan,
            previous,
        } => {
            let request = PatchRequest {
                name,
                mode,
                upload_path,
                plan,
                workdir: env.workdir.clone(),
                export_dir: env.config.export_dir.clone(),
            };
            let env = env.clone();
            ctx.tasks().spawn(TaskKey::new("encode"), async move {
                match patch::run(request, &env.encoder, previous.as_ref()).await {
                    Ok(outcome) => Action::PatchDidEncode(outcome),
                    Err(error) => {
                        tracing::warn!(%error, "patch failed");
                        Action::PatchDidError(error.to_string())
                    }
                }
            });
        }
        Effect::LoadDataset { source } => {
            let locations = DatasetLocations {
                local: env.config.local_dataset.clone(),
                url: env.config.json_url.clone(),
            };
            ctx.tasks().spawn(TaskKey::new("dataset"), async move {
                match api::load_dataset(&source, &locations).await {
                    Ok((dataset, source)) => Action::MovesDidLoad { dataset, source },
                    Err(error) => Action::MovesDidError(error.to_string()),
                }
            });
        }
        Effect::WriteExport { bytes } => {
            let dir = env.config.export_dir.clone();
            let filename = export::export_filename(chrono::Local::now().date_naive());
            ctx.tasks().spawn(TaskKey::new("export"), async move {
                match api::write_export(&dir, &filename, &bytes).await {
                    Ok(path) => Action::ExportDidWrite(path.display().to_string()),
                    Err(error) => Action::ExportDidError(error),
                }
            });
        }
    }
}
