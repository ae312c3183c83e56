use std::fs;
use std::io::{self, Read, Write};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use linkbatch_core::{update, AppState, Msg, StreamOutcome, UiState};
use linkbatch_logging::{lb_info, lb_warn};

use super::config::Args;
use super::effects::EffectRunner;
use super::logging;
use super::render::TerminalRenderer;

pub fn run_app() -> Result<ExitCode> {
    let args = Args::parse();
    logging::initialize(args.log, args.log_level, &args.log_file);

    let input = read_input(&args)?;
    let settings = args.client_settings();
    lb_info!(
        "Using service at {} ({:?} contract)",
        settings.base_url,
        settings.contract
    );

    let mut app = App::new(
        EffectRunner::new(settings),
        TerminalRenderer::new(!args.no_timestamps),
        io::stdout().lock(),
    );
    app.dispatch(Msg::InputChanged(input))?;
    app.dispatch(Msg::CredentialChanged(args.password.unwrap_or_default()))?;
    app.dispatch(Msg::SubmitClicked)?;
    app.run_until_enabled()?;

    Ok(if app.succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn read_input(args: &Args) -> Result<String> {
    match args.input_path() {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading links from {}", path.display())),
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("reading links from stdin")?;
            Ok(text)
        }
    }
}

struct App<W: Write> {
    state: AppState,
    runner: EffectRunner,
    renderer: TerminalRenderer,
    out: W,
}

impl<W: Write> App<W> {
    fn new(runner: EffectRunner, renderer: TerminalRenderer, out: W) -> Self {
        Self {
            state: AppState::new(),
            runner,
            renderer,
            out,
        }
    }

    fn dispatch(&mut self, msg: Msg) -> Result<()> {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        self.runner.enqueue(effects);
        if state.consume_dirty() {
            self.renderer
                .render(&state.view(), &mut self.out)
                .context("writing results")?;
        }
        self.state = state;
        Ok(())
    }

    /// Pumps engine events until the submit affordance is enabled again.
    fn run_until_enabled(&mut self) -> Result<()> {
        while !self.state.ui().submit_enabled() {
            let Some(msg) = self.runner.next_msg() else {
                lb_warn!("Engine stopped while {:?}", self.state.ui());
                bail!("engine stopped before the task finished");
            };
            self.dispatch(msg)?;
        }
        Ok(())
    }

    /// True after a completed stream or a single-shot response.
    fn succeeded(&self) -> bool {
        let view = self.state.view();
        // Single-shot results carry no stream outcome.
        matches!(
            (&view.ui, &view.outcome),
            (UiState::Done, Some(StreamOutcome::Completed) | None)
        )
    }
}
