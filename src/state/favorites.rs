use crate::state::store::JsonStore;
use anyhow::Result;
use football_api::Match;
use log::{debug, warn};

pub const FAVORITES_KEY: &str = "favorites";

/// Favorite matches, unique by fixture id and ordered by kickoff.
/// Every mutation is written through to the store before returning.
#[derive(Debug)]
pub struct FavoritesStore {
    kv: JsonStore,
    favorites: Vec<Match>,
}

impl FavoritesStore {
    /// Load the persisted list. A missing or unreadable blob starts empty.
    pub fn load(kv: JsonStore) -> Self {
        let favorites = read_favorites(&kv).unwrap_or_else(|e| {
            warn!("ignoring stored favorites: {e:#}");
            Vec::new()
        });
        Self { kv, favorites }
    }

    /// Like `load`, but an unreadable blob is an error.
    pub fn try_load(kv: JsonStore) -> Result<Self> {
        let favorites = read_favorites(&kv)?;
        Ok(Self { kv, favorites })
    }

    pub fn all(&self) -> &[Match] {
        &self.favorites
    }

    pub fn contains(&self, fixture_id: u64) -> bool {
        self.favorites.iter().any(|m| m.id() == fixture_id)
    }

    /// Remove the match if it is a favorite, otherwise add it. Returns whether
    /// the match is a favorite afterwards. The in-memory list changes even
    /// when persisting fails.
    pub fn toggle(&mut self, m: &Match) -> Result<bool> {
        let added = match self.favorites.iter().position(|f| f.id() == m.id()) {
            Some(idx) => {
                self.favorites.remove(idx);
                false
            }
            None => {
                self.favorites.push(m.clone());
                sort_by_kickoff(&mut self.favorites);
                true
            }
        };
        self.kv.put(FAVORITES_KEY, &self.favorites)?;
        Ok(added)
    }
}

fn read_favorites(kv: &JsonStore) -> Result<Vec<Match>> {
    let mut favorites = kv.get::<Vec<Match>>(FAVORITES_KEY)?.unwrap_or_default();
    sort_by_kickoff(&mut favorites);
    dedup_by_fixture(&mut favorites);
    debug!("loaded {} favorites", favorites.len());
    Ok(favorites)
}

fn sort_by_kickoff(list: &mut [Match]) {
    list.sort_by_key(|m| m.fixture.timestamp);
}

fn dedup_by_fixture(list: &mut Vec<Match>) {
    let mut seen = std::collections::HashSet::new();
    list.retain(|m| seen.insert(m.id()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::store::{scratch_store, unwritable_store};

    fn fixture(id: u64, timestamp: i64) -> Match {
        let mut m = Match::default();
        m.fixture.id = id;
        m.fixture.timestamp = timestamp;
        m.teams.home.name = format!("Home {id}");
        m.teams.away.name = format!("Away {id}");
        m
    }

    fn ids(store: &FavoritesStore) -> Vec<u64> {
        store.all().iter().map(Match::id).collect()
    }

    #[test]
    fn empty_store_has_no_favorites() {
        let store = FavoritesStore::load(scratch_store("fav-empty"));
        assert!(store.all().is_empty());
        assert!(!store.contains(1));
    }

    #[test]
    fn toggle_adds_in_kickoff_order() {
        let mut store = FavoritesStore::load(scratch_store("fav-order"));
        assert!(store.toggle(&fixture(1, 300)).unwrap());
        assert!(store.toggle(&fixture(2, 100)).unwrap());
        assert!(store.toggle(&fixture(3, 200)).unwrap());
        assert_eq!(ids(&store), vec![2, 3, 1]);
        assert!(store.contains(3));
    }

    #[test]
    fn toggle_twice_restores_original_list() {
        let mut store = FavoritesStore::load(scratch_store("fav-inverse"));
        store.toggle(&fixture(1, 100)).unwrap();
        store.toggle(&fixture(2, 200)).unwrap();
        let before = store.all().to_vec();

        let extra = fixture(3, 150);
        assert!(store.toggle(&extra).unwrap());
        assert!(!store.toggle(&extra).unwrap());
        assert_eq!(store.all(), before.as_slice());
    }

    #[test]
    fn toggle_matches_by_fixture_id() {
        let mut store = FavoritesStore::load(scratch_store("fav-identity"));
        store.toggle(&fixture(7, 100)).unwrap();

        let mut refreshed = fixture(7, 100);
        refreshed.fixture.status.short = "FT".into();
        assert!(!store.toggle(&refreshed).unwrap());
        assert!(store.all().is_empty());
    }

    #[test]
    fn list_stays_sorted_and_unique_over_many_toggles() {
        let mut store = FavoritesStore::load(scratch_store("fav-sequence"));
        let pool: Vec<Match> = (0..8u64).map(|i| fixture(i, ((i * 37) % 11) as i64)).collect();
        for step in 0..40usize {
            store.toggle(&pool[(step * 5) % pool.len()]).unwrap();
            let stamps: Vec<i64> = store.all().iter().map(|m| m.fixture.timestamp).collect();
            assert!(stamps.windows(2).all(|w| w[0] <= w[1]), "unsorted at step {step}: {stamps:?}");
            let mut unique = ids(&store);
            unique.sort_unstable();
            unique.dedup();
            assert_eq!(unique.len(), store.all().len());
        }
    }

    #[test]
    fn favorites_survive_reload() {
        let kv = scratch_store("fav-reload");
        let mut store = FavoritesStore::load(kv.clone());
        store.toggle(&fixture(10, 500)).unwrap();
        store.toggle(&fixture(11, 400)).unwrap();

        let reloaded = FavoritesStore::load(kv);
        assert_eq!(ids(&reloaded), vec![11, 10]);
    }

    #[test]
    fn unsorted_or_duplicated_blob_is_normalised_on_load() {
        let kv = scratch_store("fav-normalise");
        kv.put(FAVORITES_KEY, &vec![fixture(1, 50), fixture(2, 10), fixture(1, 50)])
            .unwrap();
        let store = FavoritesStore::load(kv);
        assert_eq!(ids(&store), vec![2, 1]);
    }

    #[test]
    fn corrupt_blob_starts_empty() {
        let kv = scratch_store("fav-corrupt");
        std::fs::create_dir_all(kv.dir()).unwrap();
        std::fs::write(kv.path(FAVORITES_KEY), "[{").unwrap();
        let mut store = FavoritesStore::load(kv.clone());
        assert!(store.all().is_empty());

        store.toggle(&fixture(4, 1)).unwrap();
        assert_eq!(ids(&FavoritesStore::load(kv)), vec![4]);
    }

    #[test]
    fn try_load_surfaces_corrupt_blob() {
        let kv = scratch_store("fav-try-corrupt");
        std::fs::create_dir_all(kv.dir()).unwrap();
        std::fs::write(kv.path(FAVORITES_KEY), "[{").unwrap();
        let err = FavoritesStore::try_load(kv).unwrap_err();
        assert!(format!("{err:#}").contains("parse"), "got {err:#}");

        let missing = FavoritesStore::try_load(scratch_store("fav-try-missing")).unwrap();
        assert!(missing.all().is_empty());
    }

    #[test]
    fn failed_write_still_changes_the_list() {
        let mut store = FavoritesStore::load(unwritable_store("fav-unwritable"));
        assert!(store.toggle(&fixture(1, 100)).is_err());
        assert_eq!(ids(&store), vec![1]);
        assert!(store.contains(1));

        assert!(store.toggle(&fixture(1, 100)).is_err());
        assert!(store.all().is_empty());
    }
}
