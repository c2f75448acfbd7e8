//! Replays scripted touch sequences against a slider and prints what the
//! render side would draw.

use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use glide_slider::{
    ActiveObserver, Color, LayoutRect, Projector, ScrollState, SharedValue, Slider,
    SliderArgsBuilder, TouchEvent,
};
use tokio::task::JoinHandle;
use tracing::info;

/// Touch scenarios the demo can replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Scenario {
    /// Tap in the middle of the track.
    Tap,
    /// Press, drag across the track and past its edges, release.
    Drag,
    /// Touch while the enclosing list is flinging.
    Scroll,
    /// All of the above in order.
    All,
}

#[derive(Debug, Parser)]
#[command(about = "Drive a glide slider with scripted touches")]
struct Args {
    /// Upper bound of the slider value.
    #[arg(long, default_value_t = 100.0)]
    max_value: f32,
    /// Track width in pixels.
    #[arg(long, default_value_t = 300.0)]
    width: f32,
    /// Settle delay after each commit, in milliseconds.
    #[arg(long, default_value_t = 100)]
    settle_ms: u64,
    #[arg(long, value_enum, default_value_t = Scenario::All)]
    scenario: Scenario,
}

fn init_tracing() {
    let filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            match tracing_subscriber::EnvFilter::try_new("error,glide_slider=info,glide_demo=info") {
                Ok(filter) => filter,
                Err(_) => tracing_subscriber::EnvFilter::new("error"),
            }
        }
    };

    let _ = tracing_subscriber::fmt()
        .pretty()
        .with_env_filter(filter)
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
        .try_init();
}

struct Demo {
    slider: Slider,
    projector: Projector,
    scroll: ScrollState,
    origin_x: f32,
    y: f32,
}

impl Demo {
    fn touch(&mut self, touch: TouchEvent) -> Option<JoinHandle<()>> {
        let pending = self.slider.handle_touch(touch);
        info!(phase = ?touch.phase, x = touch.x, value = self.slider.value(), "touch");
        if self.projector.is_stale() {
            let frame = self.projector.frame();
            info!(
                thumb = frame.thumb_offset,
                fill = frame.fill_width,
                "redraw"
            );
        }
        pending
    }

    async fn finish(&mut self, touch: TouchEvent) -> anyhow::Result<()> {
        if let Some(pending) = self.touch(touch) {
            pending.await.context("commit task failed")?;
        }
        info!(active = self.slider.is_active(), "sequence settled");
        Ok(())
    }

    fn at(&self, fraction: f32) -> f32 {
        self.origin_x + self.slider.geometry().width * fraction
    }

    async fn tap(&mut self) -> anyhow::Result<()> {
        info!("scenario: tap");
        let (x, y) = (self.at(0.5), self.y);
        self.touch(TouchEvent::down(x, y));
        self.finish(TouchEvent::up(x, y)).await
    }

    async fn drag(&mut self) -> anyhow::Result<()> {
        info!("scenario: drag");
        let y = self.y;
        self.touch(TouchEvent::down(self.at(0.25), y));
        for step in 0..=12 {
            let fraction = -0.2 + step as f32 * 0.1;
            self.touch(TouchEvent::moved(self.at(fraction), y));
        }
        self.finish(TouchEvent::up(self.at(0.75), y)).await
    }

    async fn scroll(&mut self) -> anyhow::Result<()> {
        info!("scenario: scroll");
        let before = self.slider.value();
        self.scroll.set_scrolling(true);
        let (x, y) = (self.at(0.1), self.y);
        self.touch(TouchEvent::down(x, y));
        self.touch(TouchEvent::moved(x, y + 80.0));
        self.finish(TouchEvent::up(x, y + 120.0)).await?;
        self.scroll.set_scrolling(false);
        info!(before, after = self.slider.value(), "scroll kept the touch");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let value = SharedValue::new(0.0);
    let scroll = ScrollState::default();
    let slider_args = SliderArgsBuilder::default()
        .max_value(args.max_value)
        .value(value.clone())
        .thumb_size(40.0)
        .background_color(Color::from_hex("#ccc")?)
        .color(Color::from_hex("#bb00ffe0")?)
        .settle_delay(Duration::from_millis(args.settle_ms))
        .scroll(scroll.clone())
        .on_active_change(ActiveObserver::new(|active| {
            info!(active, "interaction flag changed")
        }))
        .on_value_change(|committed: f32| async move {
            info!(committed, "slider value");
            Ok::<(), glide_slider::CommitError>(())
        })
        .build()?;
    let slider = Slider::new(slider_args)?;

    let origin_x = 24.0;
    let y = 200.0;
    slider.on_layout_rect(LayoutRect::new(origin_x, y, args.width, 6.0));

    let mut demo = Demo {
        projector: slider.projector(),
        slider,
        scroll,
        origin_x,
        y: y + 3.0,
    };
    match args.scenario {
        Scenario::Tap => demo.tap().await?,
        Scenario::Drag => demo.drag().await?,
        Scenario::Scroll => demo.scroll().await?,
        Scenario::All => {
            demo.tap().await?;
            demo.drag().await?;
            demo.scroll().await?;
        }
    }

    info!(final_value = value.get(), "done");
    Ok(())
}
