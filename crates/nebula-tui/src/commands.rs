//! Slash command parsing.
//!
//! Lines starting with `/` are commands; anything else is local chat.

use nebula_app::Intent;
use nebula_proto::{ClientCommand, model::ChatChannel};

use crate::views::Screen;

/// What a submitted line asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Hand an intent to the runtime.
    Intent(Intent),
    /// Switch screens.
    Show(Screen),
    /// Load and open a battle replay.
    OpenBattle {
        /// Battle id.
        battle_id: String,
    },
    /// Follow a player on the galaxy map.
    Track {
        /// Player name.
        username: String,
    },
    /// Stop following a player.
    Untrack {
        /// Player name.
        username: String,
    },
    /// Show the command list.
    Help,
    /// Wrong arguments; show usage.
    Usage(&'static str),
    /// Command not recognized.
    Unknown(String),
}

/// One-line summary of every command.
pub const HELP: &str = "/register /login /logout /travel /jump /dock /undock /mine /craft \
                        /attack /scan /buy /sell /status /system /say /sys /fac /w /accept \
                        /decline /dismiss /map /replay /battle /track /untrack /connect \
                        /disconnect /reset /quit";

fn game(command: ClientCommand) -> Command {
    Command::Intent(Intent::Command(command))
}

fn chat(channel: ChatChannel, content: &str, target_id: Option<String>) -> Command {
    game(ClientCommand::Chat { channel, content: content.to_string(), target_id })
}

/// Parse a submitted line.
pub fn parse(line: &str) -> Command {
    let Some(body) = line.strip_prefix('/') else {
        return chat(ChatChannel::Local, line, None);
    };

    let (name, rest) = body.split_once(char::is_whitespace).unwrap_or((body, ""));
    let rest = rest.trim();
    let args: Vec<&str> = rest.split_whitespace().collect();
    let one = |usage: &'static str, build: fn(String) -> Command| match args.as_slice() {
        [arg] => build((*arg).to_string()),
        _ => Command::Usage(usage),
    };
    let text = |usage: &'static str, channel: ChatChannel| {
        if rest.is_empty() { Command::Usage(usage) } else { chat(channel, rest, None) }
    };

    match name {
        "register" => match args.as_slice() {
            [username, empire] => Command::Intent(Intent::Register {
                username: (*username).to_string(),
                empire: (*empire).to_string(),
            }),
            _ => Command::Usage("/register <username> <empire>"),
        },
        "login" => match args.as_slice() {
            [username, password] => game(ClientCommand::Login {
                username: (*username).to_string(),
                password: (*password).to_string(),
            }),
            _ => Command::Usage("/login <username> <password>"),
        },
        "logout" => game(ClientCommand::Logout),
        "travel" => one("/travel <poi>", |target_poi| game(ClientCommand::Travel { target_poi })),
        "jump" => one("/jump <system>", |target_system| game(ClientCommand::Jump { target_system })),
        "dock" => game(ClientCommand::Dock),
        "undock" => game(ClientCommand::Undock),
        "mine" => game(ClientCommand::Mine),
        "craft" => one("/craft <recipe>", |recipe_id| game(ClientCommand::Craft { recipe_id })),
        "attack" => one("/attack <target>", |target_id| game(ClientCommand::Attack { target_id })),
        "scan" => one("/scan <target>", |target_id| game(ClientCommand::Scan { target_id })),
        "buy" | "sell" => {
            let (item, quantity) = match args.as_slice() {
                [item] => (*item, Some(1)),
                [item, qty] => (*item, qty.parse::<u32>().ok().filter(|q| *q > 0)),
                _ => ("", None),
            };
            match (name, quantity) {
                (_, None) => Command::Usage("/buy|/sell <item> [quantity]"),
                ("buy", Some(quantity)) => {
                    game(ClientCommand::Buy { item_id: item.to_string(), quantity })
                },
                (_, Some(quantity)) => {
                    game(ClientCommand::Sell { item_id: item.to_string(), quantity })
                },
            }
        },
        "status" => game(ClientCommand::GetStatus),
        "system" => game(ClientCommand::GetSystem),
        "say" => text("/say <message>", ChatChannel::Local),
        "sys" => text("/sys <message>", ChatChannel::System),
        "fac" => text("/fac <message>", ChatChannel::Faction),
        "w" => match rest.split_once(char::is_whitespace) {
            Some((target, message)) if !message.trim().is_empty() => {
                chat(ChatChannel::Private, message.trim(), Some(target.to_string()))
            },
            _ => Command::Usage("/w <player> <message>"),
        },
        "accept" => one("/accept <trade>", |trade_id| game(ClientCommand::TradeAccept { trade_id })),
        "decline" => {
            one("/decline <trade>", |trade_id| game(ClientCommand::TradeDecline { trade_id }))
        },
        "dismiss" => one("/dismiss <trade>", |trade_id| {
            Command::Intent(Intent::DismissTrade { trade_id })
        }),
        "play" => Command::Show(Screen::Play),
        "map" => Command::Show(Screen::Map),
        "replay" => Command::Show(Screen::Replay),
        "battle" => one("/battle <id>", |battle_id| Command::OpenBattle { battle_id }),
        "track" => one("/track <player>", |username| Command::Track { username }),
        "untrack" => one("/untrack <player>", |username| Command::Untrack { username }),
        "connect" => Command::Intent(Intent::Connect),
        "disconnect" => Command::Intent(Intent::Disconnect),
        "reset" => Command::Intent(Intent::Reset),
        "quit" | "q" => Command::Intent(Intent::Quit),
        "help" | "?" => Command::Help,
        other => Command::Unknown(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_local_chat() {
        assert_eq!(parse("hello there"), chat(ChatChannel::Local, "hello there", None));
    }

    #[test]
    fn whisper_keeps_message_spacing() {
        assert_eq!(
            parse("/w vega meet at  the belt"),
            chat(ChatChannel::Private, "meet at  the belt", Some("vega".into()))
        );
        assert_eq!(parse("/w vega"), Command::Usage("/w <player> <message>"));
    }

    #[test]
    fn register_needs_two_arguments() {
        assert_eq!(
            parse("/register nova solarian"),
            Command::Intent(Intent::Register { username: "nova".into(), empire: "solarian".into() })
        );
        assert!(matches!(parse("/register nova"), Command::Usage(_)));
    }

    #[test]
    fn market_quantity_defaults_to_one() {
        assert_eq!(
            parse("/buy ore"),
            game(ClientCommand::Buy { item_id: "ore".into(), quantity: 1 })
        );
        assert_eq!(
            parse("/sell ore 12"),
            game(ClientCommand::Sell { item_id: "ore".into(), quantity: 12 })
        );
        assert!(matches!(parse("/sell ore zero"), Command::Usage(_)));
        assert!(matches!(parse("/buy ore 0"), Command::Usage(_)));
    }

    #[test]
    fn local_commands() {
        assert_eq!(parse("/map"), Command::Show(Screen::Map));
        assert_eq!(parse("/battle b42"), Command::OpenBattle { battle_id: "b42".into() });
        assert_eq!(parse("/track vega"), Command::Track { username: "vega".into() });
        assert_eq!(parse("/q"), Command::Intent(Intent::Quit));
        assert_eq!(parse("/warp"), Command::Unknown("warp".into()));
    }

    #[test]
    fn every_help_entry_parses() {
        for entry in HELP.split_whitespace() {
            assert!(!matches!(parse(entry), Command::Unknown(_)), "{entry} is not a command");
        }
    }
}
