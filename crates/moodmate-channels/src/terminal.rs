//! Terminal surface: markdown rendered with termimad, ASCII bar chart.

use std::io::Write;

use anyhow::Result;
use termimad::MadSkin;

use crate::chart::BarChart;
use crate::presenter::{Sender, Surface};

const CHART_WIDTH: usize = 30;

pub struct TerminalSurface {
    skin: MadSkin,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self {
            skin: MadSkin::default(),
        }
    }
}

impl Default for TerminalSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for TerminalSurface {
    fn append(&mut self, sender: Sender, text: &str) -> Result<()> {
        match sender {
            Sender::Bot => self.skin.print_text(text),
            // Typed lines are already on screen; this is for voice transcripts
            Sender::User => println!("you> {text}"),
        }
        std::io::stdout().flush()?;
        Ok(())
    }

    fn chart(&mut self, chart: &BarChart) -> Result<()> {
        println!();
        print!("{}", chart.render_ascii(CHART_WIDTH));
        println!();
        std::io::stdout().flush()?;
        Ok(())
    }
}
