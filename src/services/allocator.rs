use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::{matrix::render_matrix, selection::select_seats};
use crate::cache::SeatCache;
use crate::error::{AllocationError, StorageError};
use crate::models::{CoachLayout, NewSeat, Seat, SeatMatrix, SeatStatus};
use crate::storage::SeatStore;

/// Распределитель мест одного вагона.
///
/// Чтение -> выбор -> коммит и сброс выполняются под одним мьютексом,
/// а сам коммит в хранилище атомарный (CAS по статусу `empty`).
/// Кеш снимка заполняется и сбрасывается под тем же мьютексом.
pub struct SeatAllocator {
    store: Arc<dyn SeatStore>,
    cache: Option<Arc<dyn SeatCache>>,
    layout: CoachLayout,
    guard: Mutex<()>,
}

impl SeatAllocator {
    pub fn new(store: Arc<dyn SeatStore>, layout: CoachLayout) -> Self {
        Self { store, cache: None, layout, guard: Mutex::new(()) }
    }

    pub fn with_cache(mut self, cache: Arc<dyn SeatCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn layout(&self) -> &CoachLayout {
        &self.layout
    }

    /// Создаёт все места схемы, если хранилище пустое. Если есть хотя бы одно
    /// место, ничего не делает (даже если схема не совпадает).
    pub async fn seed_if_empty(&self) -> Result<u64, StorageError> {
        let _lock = self.guard.lock().await;

        let existing = self.store.find_all().await?;
        if !existing.is_empty() {
            // снимок из прошлого запуска может не совпадать с хранилищем
            self.invalidate_cache().await;
            if existing.len() != self.layout.total_seats() {
                warn!(
                    "Seat collection has {} seats, layout expects {}; not reseeding",
                    existing.len(),
                    self.layout.total_seats()
                );
            }
            return Ok(0);
        }

        let specs: Vec<NewSeat> = self
            .layout
            .positions()
            .map(|(row_number, seat_number)| NewSeat {
                row_number,
                seat_number,
                status: SeatStatus::Empty,
            })
            .collect();

        let created = self.store.create_many(&specs).await?;
        self.invalidate_cache().await;
        info!("Seeded {} seats ({} rows)", created, self.layout.row_count());
        Ok(created)
    }

    /// Резервирует `count` мест. Возвращает выбранные места уже в статусе `reserved`.
    pub async fn reserve(&self, count: u32) -> Result<Vec<Seat>, AllocationError> {
        let _lock = self.guard.lock().await;

        let seats = self.store.find_all().await?;
        let mut picked = select_seats(&seats, &self.layout, count)?;

        let ids: Vec<_> = picked.iter().map(|s| s.id).collect();
        self.store.reserve_seats(&ids).await?;
        self.invalidate_cache().await;

        for seat in picked.iter_mut() {
            seat.status = SeatStatus::Reserved;
        }

        info!(
            "Reserved {} seats: {:?}",
            picked.len(),
            picked.iter().map(Seat::position).collect::<Vec<_>>()
        );
        Ok(picked)
    }

    /// Переводит все места в `empty`, независимо от текущего статуса.
    pub async fn reset_all(&self) -> Result<u64, StorageError> {
        let _lock = self.guard.lock().await;
        let updated = self.store.update_all_status(SeatStatus::Empty).await?;
        self.invalidate_cache().await;
        info!("Reset {} seats to empty", updated);
        Ok(updated)
    }

    pub async fn seats(&self) -> Result<Vec<Seat>, StorageError> {
        self.store.find_all().await
    }

    /// Снимок мест через кеш. При промахе чтение хранилища и запись в кеш
    /// идут под мьютексом, так что reserve/reset не могут вклиниться между ними.
    pub async fn cached_seats(&self) -> Result<Vec<Seat>, StorageError> {
        let Some(cache) = &self.cache else {
            return self.store.find_all().await;
        };
        if let Some(seats) = cache.get_seats().await {
            return Ok(seats);
        }

        let _lock = self.guard.lock().await;
        let seats = self.store.find_all().await?;
        cache.save_seats(&seats).await;
        Ok(seats)
    }

    async fn invalidate_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate_seats().await;
        }
    }

    pub async fn matrix(&self) -> Result<SeatMatrix, StorageError> {
        let seats = self.store.find_all().await?;
        Ok(render_matrix(&seats, &self.layout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemorySeatCache;
    use crate::storage::MemorySeatStore;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    /// Кеш, который один раз задерживает запись снимка до сигнала.
    #[derive(Default)]
    struct GatedCache {
        inner: MemorySeatCache,
        armed: AtomicBool,
        entered: Notify,
        release: Notify,
    }

    #[async_trait::async_trait]
    impl SeatCache for GatedCache {
        async fn get_seats(&self) -> Option<Vec<Seat>> {
            self.inner.get_seats().await
        }

        async fn save_seats(&self, seats: &[Seat]) {
            if self.armed.swap(false, Ordering::SeqCst) {
                self.entered.notify_one();
                self.release.notified().await;
            }
            self.inner.save_seats(seats).await;
        }

        async fn invalidate_seats(&self) {
            self.inner.invalidate_seats().await;
        }
    }

    async fn seeded(layout: CoachLayout) -> (Arc<MemorySeatStore>, SeatAllocator) {
        let store = Arc::new(MemorySeatStore::new());
        let allocator = SeatAllocator::new(store.clone(), layout);
        allocator.seed_if_empty().await.unwrap();
        (store, allocator)
    }

    fn positions(seats: &[Seat]) -> Vec<(i32, i32)> {
        seats.iter().map(Seat::position).collect()
    }

    #[tokio::test]
    async fn seeding_creates_every_position_once() {
        let (store, allocator) = seeded(CoachLayout::standard()).await;

        let seats = store.find_all().await.unwrap();
        assert_eq!(seats.len(), 80);
        assert!(seats.iter().all(Seat::is_empty));
        assert_eq!(positions(&seats), CoachLayout::standard().positions().collect::<Vec<_>>());

        assert_eq!(allocator.seed_if_empty().await.unwrap(), 0);
        assert_eq!(store.find_all().await.unwrap().len(), 80);
    }

    #[tokio::test]
    async fn seeding_does_not_repair_partial_collection() {
        let store = Arc::new(MemorySeatStore::new());
        store
            .create_many(&[NewSeat { row_number: 1, seat_number: 1, status: SeatStatus::Empty }])
            .await
            .unwrap();

        let allocator = SeatAllocator::new(store.clone(), CoachLayout::standard());
        assert_eq!(allocator.seed_if_empty().await.unwrap(), 0);
        assert_eq!(store.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reservations_fill_rows_in_order() {
        let (store, allocator) = seeded(CoachLayout::standard()).await;

        let first = allocator.reserve(5).await.unwrap();
        assert_eq!(positions(&first), (1..=5).map(|n| (1, n)).collect::<Vec<_>>());
        assert!(first.iter().all(|s| s.status == SeatStatus::Reserved));

        let second = allocator.reserve(7).await.unwrap();
        assert_eq!(positions(&second), (1..=7).map(|n| (2, n)).collect::<Vec<_>>());

        // ряд 1 добираем двумя местами, чтобы ряды 1 и 2 были заполнены
        let third = allocator.reserve(2).await.unwrap();
        assert_eq!(positions(&third), vec![(1, 6), (1, 7)]);

        let fourth = allocator.reserve(4).await.unwrap();
        assert_eq!(positions(&fourth), (1..=4).map(|n| (3, n)).collect::<Vec<_>>());

        let reserved = store.find_by_status(SeatStatus::Reserved).await.unwrap();
        assert_eq!(reserved.len(), 18);
    }

    #[tokio::test]
    async fn failed_reservation_changes_nothing() {
        let (store, allocator) = seeded(CoachLayout::new(1, 3, 0)).await;
        allocator.reserve(2).await.unwrap();

        let err = allocator.reserve(2).await.unwrap_err();
        assert!(matches!(err, AllocationError::InsufficientSeats { requested: 2, available: 1 }));

        let err = allocator.reserve(4).await.unwrap_err();
        assert!(matches!(err, AllocationError::RequestTooLarge { requested: 4, max: 3 }));

        assert_eq!(store.find_by_status(SeatStatus::Empty).await.unwrap().len(), 1);
        assert_eq!(store.find_by_status(SeatStatus::Reserved).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn reset_then_matrix_is_all_free() {
        let (store, allocator) = seeded(CoachLayout::standard()).await;
        allocator.reserve(7).await.unwrap();
        let seats = store.find_all().await.unwrap();
        store.update_status(seats[10].id, SeatStatus::Booked).await.unwrap();
        assert!(allocator.matrix().await.unwrap().iter().flatten().any(|c| c.booked));

        assert_eq!(allocator.reset_all().await.unwrap(), 80);
        assert_eq!(allocator.reset_all().await.unwrap(), 80);

        let matrix = allocator.matrix().await.unwrap();
        assert_eq!(matrix.len(), 12);
        assert!(matrix.iter().flatten().all(|c| !c.booked));
        assert!(allocator.seats().await.unwrap().iter().all(Seat::is_empty));
    }

    #[tokio::test]
    async fn concurrent_reservations_never_share_a_seat() {
        let (store, allocator) = seeded(CoachLayout::standard()).await;
        let allocator = Arc::new(allocator);

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let allocator = allocator.clone();
                tokio::spawn(async move { allocator.reserve(4).await })
            })
            .collect();

        let mut taken = Vec::new();
        for handle in handles {
            taken.extend(handle.await.unwrap().unwrap().into_iter().map(|s| s.id));
        }
        taken.sort_unstable();
        taken.dedup();
        assert_eq!(taken.len(), 80);
        assert!(store.find_by_status(SeatStatus::Empty).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn cached_snapshot_reflects_reserve_and_reset() {
        let store = Arc::new(MemorySeatStore::new());
        let cache = Arc::new(MemorySeatCache::new());
        let allocator = SeatAllocator::new(store.clone(), CoachLayout::standard()).with_cache(cache.clone());
        allocator.seed_if_empty().await.unwrap();

        assert!(allocator.cached_seats().await.unwrap().iter().all(Seat::is_empty));
        assert!(cache.get_seats().await.is_some());

        allocator.reserve(3).await.unwrap();
        assert!(cache.get_seats().await.is_none());
        let seats = allocator.cached_seats().await.unwrap();
        assert_eq!(seats.iter().filter(|s| s.status == SeatStatus::Reserved).count(), 3);

        allocator.reset_all().await.unwrap();
        assert!(allocator.cached_seats().await.unwrap().iter().all(Seat::is_empty));
    }

    #[tokio::test]
    async fn failed_reservation_keeps_cached_snapshot() {
        let store = Arc::new(MemorySeatStore::new());
        let cache = Arc::new(MemorySeatCache::new());
        let allocator = SeatAllocator::new(store, CoachLayout::new(1, 2, 0)).with_cache(cache.clone());
        allocator.seed_if_empty().await.unwrap();
        allocator.cached_seats().await.unwrap();

        assert!(allocator.reserve(3).await.is_err());
        assert!(cache.get_seats().await.is_some());
    }

    #[tokio::test]
    async fn slow_cache_fill_cannot_overwrite_a_later_reservation() {
        let store = Arc::new(MemorySeatStore::new());
        let cache = Arc::new(GatedCache::default());
        let allocator = Arc::new(
            SeatAllocator::new(store.clone(), CoachLayout::standard()).with_cache(cache.clone()),
        );
        allocator.seed_if_empty().await.unwrap();
        cache.armed.store(true, Ordering::SeqCst);

        // читатель взял снимок из хранилища и застрял на записи в кеш
        let reader = {
            let allocator = allocator.clone();
            tokio::spawn(async move { allocator.cached_seats().await })
        };
        cache.entered.notified().await;

        let writer = {
            let allocator = allocator.clone();
            tokio::spawn(async move { allocator.reserve(3).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!writer.is_finished(), "reserve must wait for the cache fill");

        cache.release.notify_one();
        let before = reader.await.unwrap().unwrap();
        assert!(before.iter().all(Seat::is_empty));
        writer.await.unwrap().unwrap();

        let after = allocator.cached_seats().await.unwrap();
        assert_eq!(after, store.find_all().await.unwrap());
        assert_eq!(after.iter().filter(|s| s.status == SeatStatus::Reserved).count(), 3);
    }
}
