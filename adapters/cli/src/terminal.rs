//! Text backend that prints ASCII frames to a writer.

use std::io::Write;

use anyhow::{Context, Result};
use roomba_rendering::{render_ascii, Presentation, RenderingBackend, SceneDepths};

/// Prints every `print_every`th frame plus the final one.
#[derive(Debug)]
pub(crate) struct TerminalBackend<W> {
    out: W,
    print_every: u64,
}

impl<W: Write> TerminalBackend<W> {
    pub(crate) fn new(out: W, print_every: u64) -> Self {
        Self { out, print_every }
    }

    fn draw(&mut self, frame: u64, depths: &SceneDepths) -> Result<()> {
        writeln!(self.out, "frame {frame}")
            .and_then(|()| write!(self.out, "{}", render_ascii(depths)))
            .context("failed to write frame")
    }
}

impl<W: Write> RenderingBackend for TerminalBackend<W> {
    fn run<F>(mut self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(u64, &mut SceneDepths) -> Result<bool>,
    {
        let Presentation {
            title,
            layout,
            mut depths,
        } = presentation;

        writeln!(
            self.out,
            "{title} ({}x{} tiles, {}x{} units)",
            layout.columns,
            layout.rows,
            layout.width(),
            layout.height()
        )
        .context("failed to write title")?;
        self.draw(0, &depths)?;

        let mut frame = 0;
        loop {
            frame += 1;
            let running = update_scene(frame, &mut depths)?;
            if !running {
                self.draw(frame, &depths)?;
                break;
            }
            if self.print_every > 0 && frame % self.print_every == 0 {
                self.draw(frame, &depths)?;
            }
        }

        self.out.flush().context("failed to flush output")
    }
}
