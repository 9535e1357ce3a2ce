//! Paginated battle log loading.

use std::future::Future;

use nebula_proto::battle::{BattleEntry, BattlePage};

use crate::error::LoadError;

/// Entries requested per page.
pub const DEFAULT_PAGE_SIZE: usize = 200;

/// Source of battle log pages.
pub trait BattleSource {
    /// Source-specific error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch up to `limit` entries starting at `tick_start`.
    fn fetch_page(
        &self,
        battle_id: &str,
        tick_start: u64,
        limit: usize,
    ) -> impl Future<Output = Result<BattlePage, Self::Error>> + Send;
}

/// Load every entry of a battle, following pages until the source reports
/// no more.
///
/// Each request starts one tick past the last entry received. Entries below
/// the requested tick are discarded, and a page that adds nothing new ends
/// the loop even if it claims more remain.
pub async fn load_battle<S>(
    source: &S,
    battle_id: &str,
    page_size: usize,
) -> Result<Vec<BattleEntry>, LoadError>
where
    S: BattleSource,
{
    let page_size = page_size.max(1);
    let mut entries: Vec<BattleEntry> = Vec::new();
    let mut tick_start = 0;

    loop {
        let page = source
            .fetch_page(battle_id, tick_start, page_size)
            .await
            .map_err(|e| LoadError::Fetch { tick_start, source: Box::new(e) })?;

        let has_more = page.has_more;
        let before = entries.len();
        entries.extend(page.entries.into_iter().filter(|entry| entry.tick >= tick_start));

        let Some(last_tick) = entries[before..].iter().map(|entry| entry.tick).max() else {
            if has_more {
                tracing::warn!(battle_id, tick_start, "battle page did not advance, stopping");
            }
            break;
        };
        tick_start = last_tick + 1;

        tracing::debug!(battle_id, loaded = entries.len(), has_more, "battle page loaded");
        if !has_more {
            break;
        }
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("offline")]
    struct Offline;

    /// Serves a fixed tick range and records every request.
    struct CountingSource {
        total: u64,
        calls: Mutex<Vec<(u64, usize)>>,
        fail: bool,
    }

    impl CountingSource {
        fn new(total: u64) -> Self {
            Self { total, calls: Mutex::new(Vec::new()), fail: false }
        }
    }

    impl BattleSource for CountingSource {
        type Error = Offline;

        async fn fetch_page(
            &self,
            _battle_id: &str,
            tick_start: u64,
            limit: usize,
        ) -> Result<BattlePage, Offline> {
            self.calls.lock().unwrap().push((tick_start, limit));
            if self.fail {
                return Err(Offline);
            }
            let end = (tick_start + limit as u64).min(self.total);
            let entries =
                (tick_start..end).map(|tick| BattleEntry { tick, ..BattleEntry::default() }).collect();
            Ok(BattlePage { entries, has_more: end < self.total })
        }
    }

    #[tokio::test]
    async fn pages_until_exhausted() {
        let source = CountingSource::new(205);
        let entries = load_battle(&source, "b1", 200).await.unwrap();

        assert_eq!(entries.len(), 205);
        assert_eq!(*source.calls.lock().unwrap(), vec![(0, 200), (200, 200)]);
        assert!(entries.windows(2).all(|w| w[0].tick + 1 == w[1].tick));
    }

    #[tokio::test]
    async fn single_page_battle() {
        let source = CountingSource::new(12);
        let entries = load_battle(&source, "b1", DEFAULT_PAGE_SIZE).await.unwrap();

        assert_eq!(entries.len(), 12);
        assert_eq!(source.calls.lock().unwrap().len(), 1);
    }

    /// Ignores `tick_start` and always claims more pages remain.
    struct StuckSource {
        page: Vec<u64>,
        calls: Mutex<Vec<u64>>,
    }

    impl BattleSource for StuckSource {
        type Error = Offline;

        async fn fetch_page(
            &self,
            _battle_id: &str,
            tick_start: u64,
            _limit: usize,
        ) -> Result<BattlePage, Offline> {
            self.calls.lock().unwrap().push(tick_start);
            let entries =
                self.page.iter().map(|&tick| BattleEntry { tick, ..BattleEntry::default() }).collect();
            Ok(BattlePage { entries, has_more: true })
        }
    }

    #[tokio::test]
    async fn repeated_page_stops_loading() {
        let source = StuckSource { page: vec![0, 1, 2], calls: Mutex::new(Vec::new()) };
        let entries = load_battle(&source, "b1", 200).await.unwrap();

        let ticks: Vec<_> = entries.iter().map(|e| e.tick).collect();
        assert_eq!(ticks, [0, 1, 2]);
        assert_eq!(*source.calls.lock().unwrap(), vec![0, 3]);
    }

    #[tokio::test]
    async fn empty_page_claiming_more_stops_loading() {
        let source = StuckSource { page: vec![], calls: Mutex::new(Vec::new()) };
        let entries = load_battle(&source, "b1", 200).await.unwrap();

        assert!(entries.is_empty());
        assert_eq!(source.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn fetch_failure_is_retryable() {
        let source = CountingSource { fail: true, ..CountingSource::new(5) };
        let err = load_battle(&source, "b1", 200).await.unwrap_err();

        assert!(err.is_retryable());
        assert!(matches!(err, LoadError::Fetch { tick_start: 0, .. }));
    }
}
