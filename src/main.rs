//! Fob Arena entry point
//!
//! On the web the page drives a single controller through the exported
//! functions. Natively a headless round runs against in-memory collaborators.

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;

    use wasm_bindgen::prelude::*;

    use fob_arena::audio::WebAudio;
    use fob_arena::persistence::LocalStore;
    use fob_arena::platform::DomViewport;
    use fob_arena::{AudioSettings, GameConfig, RoundController, Variant};

    type WebController = RoundController<WebAudio, LocalStore, DomViewport>;

    thread_local! {
        static GAME: RefCell<Option<WebController>> = const { RefCell::new(None) };
    }

    fn with_game<R>(f: impl FnOnce(&mut WebController) -> R) -> Option<R> {
        GAME.with(|game| game.borrow_mut().as_mut().map(f))
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Fob Arena starting...");

        let variant = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.body())
            .and_then(|b| b.get_attribute("data-variant"))
            .and_then(|v| v.parse::<Variant>().ok())
            .unwrap_or_default();

        let seed = clock_seed();
        match RoundController::new(
            GameConfig::for_variant(variant),
            seed,
            WebAudio::new(),
            LocalStore,
            DomViewport::default(),
        ) {
            Ok(mut controller) => {
                controller.resize(true);
                GAME.with(|game| *game.borrow_mut() = Some(controller));
            }
            Err(e) => log::error!("Invalid configuration: {}", e),
        }
    }

    /// Seed from the page clock; gameplay randomness only
    fn clock_seed() -> u64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now().to_bits())
            .unwrap_or(0)
    }

    #[wasm_bindgen]
    pub fn start_round() -> bool {
        with_game(|game| game.on_start().is_ok()).unwrap_or(false)
    }

    /// Advance the game clock by `ms` milliseconds
    #[wasm_bindgen]
    pub fn advance(ms: u32) {
        with_game(|game| game.advance(ms as u64));
    }

    #[wasm_bindgen]
    pub fn resize(initial: bool) {
        with_game(|game| game.resize(initial));
    }

    #[wasm_bindgen]
    pub fn show_dialog(open: bool) {
        with_game(|game| game.show_dialog(open, true));
    }

    /// Reveal the start prompt; hidden again by the next initial resize
    #[wasm_bindgen]
    pub fn show_prompt() {
        with_game(|game| game.show_prompt());
    }

    #[wasm_bindgen]
    pub fn prompt_visible() -> bool {
        with_game(|game| game.prompt_visible()).unwrap_or(false)
    }

    /// Master volume, 0.0 - 1.0
    #[wasm_bindgen]
    pub fn set_volume(volume: f32) {
        with_game(|game| game.audio_mut().set_volume(volume));
    }

    /// Toggle sound effects and music; the choice is saved
    #[wasm_bindgen]
    pub fn set_audio(sfx: bool, music: bool) {
        with_game(|game| game.set_audio_settings(AudioSettings { sfx, music }));
    }

    #[wasm_bindgen]
    pub fn finish_round(won: bool) -> bool {
        with_game(|game| game.finish(won)).unwrap_or(false)
    }

    #[wasm_bindgen]
    pub fn ticks() -> u32 {
        with_game(|game| game.state().ticks as u32).unwrap_or(0)
    }

    #[wasm_bindgen]
    pub fn live_count() -> u32 {
        with_game(|game| game.live_count() as u32).unwrap_or(0)
    }

    #[wasm_bindgen]
    pub fn score() -> u32 {
        with_game(|game| game.score() as u32).unwrap_or(0)
    }

    /// Current bodies as JSON, for the page to draw
    #[wasm_bindgen]
    pub fn fobs_json() -> String {
        with_game(|game| serde_json::to_string(&game.state().fobs).unwrap_or_default())
            .unwrap_or_default()
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use clap::Parser;

    use fob_arena::audio::RecordingAudio;
    use fob_arena::persistence::MemoryStore;
    use fob_arena::platform::FixedViewport;
    use fob_arena::sim::Over;
    use fob_arena::stats::Stats;
    use fob_arena::{GameConfig, RoundController, Variant};

    #[derive(Parser)]
    #[command(name = "fob-arena")]
    #[command(about = "Run a headless Fob Arena round")]
    pub struct Cli {
        /// Game variant: seeker or runner
        #[arg(long, default_value = "seeker", value_parser = parse_variant)]
        variant: Variant,

        /// Random seed for spawning
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Arena width in pixels
        #[arg(long, default_value_t = 1700.0)]
        width: f32,

        /// Arena height in pixels
        #[arg(long, default_value_t = 940.0)]
        height: f32,

        /// Seconds of game time to simulate
        #[arg(long, default_value_t = 60)]
        seconds: u64,

        /// Path to a JSON config file (overrides --variant)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Runner only: end the round as lost instead of won
        #[arg(long)]
        lose: bool,
    }

    fn parse_variant(s: &str) -> Result<Variant, String> {
        s.parse().map_err(|e: fob_arena::ConfigError| e.to_string())
    }

    pub fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
        let config = match &cli.config {
            Some(path) => GameConfig::from_json(&std::fs::read_to_string(path)?)?,
            None => GameConfig::for_variant(cli.variant),
        };
        let variant = config.variant;

        let mut game = RoundController::new(
            config,
            cli.seed,
            RecordingAudio::new(),
            MemoryStore::new(),
            FixedViewport::new(cli.width, cli.height),
        )?;

        game.on_start()?;
        game.advance(cli.seconds * 1000);

        if variant == Variant::Runner {
            game.finish(!cli.lose);
        }

        let state = game.state();
        match state.over {
            Some(Over::Ticks(ticks)) => log::info!("Round over at tick {}", ticks),
            Some(Over::Won) => log::info!("Round won, score {}", game.score()),
            None => log::info!(
                "Still running after {} ticks, {} alive",
                state.ticks,
                game.live_count()
            ),
        }

        match game.stats() {
            Stats::Seeker(s) => log::info!("Plays {}, best {} ticks", s.plays, s.best_ticks),
            Stats::Runner(s) => log::info!(
                "Plays {}, won {}, best {} points",
                s.plays,
                s.won,
                s.best_points
            ),
        }
        log::info!("Cues played: {}", game.audio().played.len());

        if let Some(blob) = game.store().blob() {
            println!("{}", blob);
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;

    env_logger::init();
    log::info!("Fob Arena (native) starting...");

    if let Err(e) = headless::run(headless::Cli::parse()) {
        log::error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
