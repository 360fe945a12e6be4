//! list / show 子命令

use anyhow::{Context, Result};
use podcast_api::{strip_html, EpisodeQuery, EpisodeSource, HomeListing};
use podcast_player::Episode;

pub fn list(source: &dyn EpisodeSource, limit: usize, latest_count: usize) -> Result<()> {
    let episodes = source
        .episodes(&EpisodeQuery::latest(limit))
        .context("failed to fetch episodes")?;
    print!("{}", render_listing(&HomeListing::split(episodes, latest_count)));
    Ok(())
}

pub fn show(source: &dyn EpisodeSource, id: &str) -> Result<()> {
    let episode = source
        .episode(id)
        .with_context(|| format!("failed to fetch episode {id}"))?;
    print!("{}", render_episode(&episode));
    Ok(())
}

fn episode_line(position: usize, episode: &Episode) -> String {
    format!(
        "{:>3}. {}\n     {} | {} | {} | id: {}\n",
        position,
        episode.title,
        episode.members,
        episode.published_at.as_deref().unwrap_or("-"),
        episode.display_duration(),
        episode.id
    )
}

/// 序号与 `play --start` 使用的队列位置一致（从 0 开始）
pub fn render_listing(listing: &HomeListing) -> String {
    if listing.is_empty() {
        return "No episodes found.\n".to_string();
    }

    let mut out = String::from("Latest episodes\n");
    for (index, episode) in listing.latest.iter().enumerate() {
        out.push_str(&episode_line(index, episode));
    }

    if !listing.older.is_empty() {
        out.push_str("\nAll episodes\n");
        for (index, episode) in listing.older.iter().enumerate() {
            out.push_str(&episode_line(listing.older_queue_index(index), episode));
        }
    }
    out
}

pub fn render_episode(episode: &Episode) -> String {
    let mut out = format!(
        "{}\n{}\nPublished: {}\nDuration:  {}\nAudio:     {}\n",
        episode.title,
        episode.members,
        episode.published_at.as_deref().unwrap_or("-"),
        episode.display_duration(),
        episode.url
    );
    if let Some(description) = &episode.description {
        out.push('\n');
        out.push_str(&strip_html(description));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode(id: &str, duration: u64) -> Episode {
        Episode::new(id, format!("Title {id}"), format!("/{id}.mp3"))
            .with_members("Ana")
            .with_published_at("Jan 22 2021")
            .with_duration(duration)
    }

    #[test]
    fn test_render_listing_sections() {
        let listing = HomeListing::split(vec![episode("a", 65), episode("b", 3600), episode("c", 5)], 2);
        let text = render_listing(&listing);

        assert!(text.starts_with("Latest episodes\n  0. Title a\n"));
        assert!(text.contains("     Ana | Jan 22 2021 | 01:00:00 | id: b\n"));
        assert!(text.contains("\nAll episodes\n  2. Title c\n"));
    }

    #[test]
    fn test_render_empty_listing() {
        assert_eq!(render_listing(&HomeListing::default()), "No episodes found.\n");
    }

    #[test]
    fn test_render_episode_strips_description() {
        let text = render_episode(&episode("a", 65).with_description("<p>Hello <b>world</b></p>"));
        assert!(text.contains("Duration:  01:05\n"));
        assert!(text.ends_with("\nHello world\n"));
    }
}
