use clap::Subcommand;

use crate::application::DEFAULT_TEMPERATURE;

#[derive(Subcommand)]
pub enum Commands {
    /// Send a single prompt outside any conversation
    Ask {
        prompt: String,

        /// System message sent ahead of the prompt
        #[arg(short, long)]
        system: Option<String>,

        #[arg(short, long, default_value_t = DEFAULT_TEMPERATURE)]
        temperature: f32,
    },

    /// Start an interactive conversation on stdin (/history, /clear, /quit)
    Chat {
        /// System message sent ahead of every prompt
        #[arg(short, long)]
        system: Option<String>,

        #[arg(short, long, default_value_t = DEFAULT_TEMPERATURE)]
        temperature: f32,
    },

    /// Summarize the master log, or list one conversation's entries
    Log {
        #[arg(short, long)]
        conversation: Option<String>,
    },
}

impl Commands {
    /// Commands that never call the completion endpoint.
    pub fn is_offline(&self) -> bool {
        matches!(self, Commands::Log { .. })
    }
}
