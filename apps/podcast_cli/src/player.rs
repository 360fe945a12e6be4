//! play 子命令 - 终端播放

use std::io::{BufRead, Write};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use crossbeam_channel::{never, select, tick, unbounded, Receiver};
use podcast_api::{EpisodeQuery, EpisodeSource};
use podcast_player::{
    format_duration, spawn_engine, EngineConfig, Episode, PlaybackBinding, PlayerState,
    PlayerStore,
};

/// 标准输入中的单行命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    TogglePlay,
    Next,
    Previous,
    ToggleLoop,
    ToggleShuffle,
    Seek(u64),
    Help,
    Quit,
}

const HELP: &str = "commands: p play/pause, n next, b previous, l loop, s shuffle, seek <secs|mm:ss>, q quit";

pub fn parse_command(line: &str) -> Result<InputCommand, String> {
    let mut parts = line.split_whitespace();
    let Some(word) = parts.next() else {
        return Err("empty command".to_string());
    };

    let command = match word {
        "p" | "play" | "pause" => InputCommand::TogglePlay,
        "n" | "next" => InputCommand::Next,
        "b" | "prev" | "previous" => InputCommand::Previous,
        "l" | "loop" => InputCommand::ToggleLoop,
        "s" | "shuffle" => InputCommand::ToggleShuffle,
        "h" | "help" | "?" => InputCommand::Help,
        "q" | "quit" | "exit" => InputCommand::Quit,
        "seek" => {
            let target = parts.next().ok_or("seek needs a position")?;
            InputCommand::Seek(parse_position(target)?)
        }
        other => return Err(format!("unknown command {other:?}")),
    };

    if parts.next().is_some() {
        return Err(format!("unexpected arguments after {word:?}"));
    }
    Ok(command)
}

/// 接受秒数或 `mm:ss`
fn parse_position(text: &str) -> Result<u64, String> {
    let invalid = || format!("invalid position {text:?}");
    match text.split_once(':') {
        Some((minutes, seconds)) => {
            let minutes: u64 = minutes.parse().map_err(|_| invalid())?;
            let seconds: u64 = seconds.parse().map_err(|_| invalid())?;
            if seconds >= 60 {
                return Err(invalid());
            }
            Ok(minutes * 60 + seconds)
        }
        None => text.parse().map_err(|_| invalid()),
    }
}

/// 当前播放状态的一行摘要
pub fn status_line(state: &PlayerState) -> String {
    let Some(episode) = state.current_episode() else {
        return "stopped".to_string();
    };

    let mut line = format!(
        "{} {} | {} / {}",
        if state.is_playing() { "▶" } else { "⏸" },
        episode.title,
        format_duration(state.progress().unwrap_or(0)),
        format_duration(episode.duration)
    );
    if state.is_looping() {
        line.push_str(" [loop]");
    }
    if state.is_shuffling() {
        line.push_str(" [shuffle]");
    }
    if let Some(error) = state.error() {
        line.push_str(&format!(" (error: {error})"));
    }
    line
}

/// 组装播放队列：指定 id 优先，否则取最新 `latest` 集
pub fn build_queue(source: &dyn EpisodeSource, ids: &[String], latest: usize) -> Result<Vec<Episode>> {
    if ids.is_empty() {
        return source
            .episodes(&EpisodeQuery::latest(latest))
            .context("failed to fetch episodes");
    }

    ids.iter()
        .map(|id| {
            source
                .episode(id)
                .with_context(|| format!("failed to fetch episode {id}"))
        })
        .collect()
}

pub fn play(queue: Vec<Episode>, start: usize, engine_config: EngineConfig) -> Result<()> {
    if queue.is_empty() {
        bail!("nothing to play");
    }

    let engine = spawn_engine(engine_config);
    let events = engine.events();
    let mut binding = PlaybackBinding::new(engine);
    let mut store = PlayerStore::new();
    let changes = store.subscribe();

    let mut input = spawn_stdin_reader();
    let ticker = tick(Duration::from_millis(500));
    let mut last_line = String::new();

    println!("{HELP}");
    store.play_list(queue, start);
    binding.sync(&mut store);

    let mut quit = false;
    let mut stdin_closed = false;
    while !quit {
        select! {
            recv(input) -> line => match line {
                Ok(line) => match parse_command(&line) {
                    Ok(InputCommand::Quit) => quit = true,
                    Ok(InputCommand::Help) => println!("{HELP}"),
                    Ok(InputCommand::Seek(seconds)) => binding.seek(&mut store, seconds),
                    Ok(command) => {
                        apply(&mut store, command);
                        binding.sync(&mut store);
                    }
                    Err(_) if line.trim().is_empty() => {}
                    Err(e) => println!("\n{e}"),
                },
                Err(_) => stdin_closed = true,
            },
            recv(events) -> event => match event {
                Ok(event) => binding.handle_event(&mut store, event),
                Err(_) => bail!("audio engine stopped unexpectedly"),
            },
            recv(changes) -> _ => {},
            recv(ticker) -> _ => {},
        }

        // 标准输入关闭后继续播放到队列结束
        if stdin_closed {
            input = never();
            stdin_closed = false;
        }

        if store.state().is_idle() {
            println!("\nqueue finished");
            break;
        }

        let line = status_line(store.state());
        if line != last_line {
            print!("\r\x1b[2K{line}");
            let _ = std::io::stdout().flush();
            last_line = line;
        }
    }

    store.clear();
    binding.sync(&mut store);
    Ok(())
}

fn apply(store: &mut PlayerStore, command: InputCommand) {
    match command {
        InputCommand::TogglePlay => store.toggle_play(),
        InputCommand::Next => store.play_next(),
        InputCommand::Previous => store.play_previous(),
        InputCommand::ToggleLoop => store.toggle_loop(),
        InputCommand::ToggleShuffle => store.toggle_shuffle(),
        InputCommand::Seek(_) | InputCommand::Help | InputCommand::Quit => {}
    }
}

fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = unbounded();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}
