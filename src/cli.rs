use clap::{Args as ClapArgs, Parser, Subcommand};

/// Chat with a remote flow from the terminal.
#[derive(Parser, Debug)]
#[command(name = "flow_chat", version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging (use multiple times for more verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Send a message and stream the answer
    Send {
        message: String,

        /// Continue an existing session instead of starting a new one
        #[arg(short, long)]
        session: Option<String>,
    },

    /// List recent sessions
    Sessions {
        #[arg(short, long, default_value_t = flow_api::history::DEFAULT_SESSION_LIMIT)]
        limit: usize,
    },

    /// Print the transcript of a session
    Show { session: String },

    /// Delete every message of a session
    Delete { session: String },

    /// Check that the server and flow are reachable
    Ping,

    /// Inspect or change stored settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ConfigAction {
    /// Print the effective settings
    Show,
    /// Store new values
    Set(ConfigValues),
}

#[derive(ClapArgs, Debug, Default, PartialEq, Eq)]
pub struct ConfigValues {
    #[arg(long)]
    pub base_url: Option<String>,

    /// API key; pass an empty string to remove it
    #[arg(long)]
    pub api_key: Option<String>,

    #[arg(long)]
    pub flow_id: Option<String>,

    /// Name shown for the assistant
    #[arg(long)]
    pub ai_name: Option<String>,
}

impl ConfigValues {
    #[must_use]
    pub fn into_patch(self) -> settings_store::SettingsPatch {
        settings_store::SettingsPatch {
            base_url: self.base_url,
            api_key: self.api_key,
            flow_id: self.flow_id,
            ai_name: self.ai_name,
        }
    }
}
