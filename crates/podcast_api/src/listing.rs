//! 首页列表

use podcast_player::Episode;

/// 首页分组：最新几集 + 其余
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HomeListing {
    pub latest: Vec<Episode>,
    pub older: Vec<Episode>,
}

impl HomeListing {
    /// 前 `latest_count` 集归入最新，其余归入更早
    pub fn split(mut episodes: Vec<Episode>, latest_count: usize) -> Self {
        let older = episodes.split_off(latest_count.min(episodes.len()));
        Self {
            latest: episodes,
            older,
        }
    }

    /// 从列表播放时使用的队列顺序
    pub fn queue(&self) -> Vec<Episode> {
        self.latest.iter().chain(&self.older).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.latest.len() + self.older.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latest.is_empty() && self.older.is_empty()
    }

    /// 更早列表中第 `index` 项在队列里的位置
    pub fn older_queue_index(&self, index: usize) -> usize {
        self.latest.len() + index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episodes(n: usize) -> Vec<Episode> {
        (0..n)
            .map(|i| Episode::new(format!("ep{i}"), format!("Episode {i}"), format!("/{i}.mp3")))
            .collect()
    }

    #[test]
    fn test_split_latest_and_older() {
        let listing = HomeListing::split(episodes(5), 2);
        assert_eq!(listing.latest.len(), 2);
        assert_eq!(listing.older.len(), 3);
        assert_eq!(listing.older[0].id, "ep2");
        assert_eq!(listing.older_queue_index(0), 2);
    }

    #[test]
    fn test_split_short_list() {
        let listing = HomeListing::split(episodes(1), 2);
        assert_eq!(listing.latest.len(), 1);
        assert!(listing.older.is_empty());
        assert_eq!(listing.len(), 1);

        assert!(HomeListing::split(Vec::new(), 2).is_empty());
    }

    #[test]
    fn test_queue_keeps_listing_order() {
        let listing = HomeListing::split(episodes(4), 2);
        let ids: Vec<_> = listing.queue().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, ["ep0", "ep1", "ep2", "ep3"]);
    }
}
