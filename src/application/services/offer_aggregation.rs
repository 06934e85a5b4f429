//! # Offer Aggregation Engine
//!
//! Orchestrates the downstream fan-out and ranks the priced offers.
//!
//! ```text
//! region info (once) ─► dealer list ─┬─► dealer detail ─┬─► price ─► [discount] ─► price engine ─► dedup map
//!                                    │                  └─► ...
//!                                    └─► ...
//!                                                       join all ─► ranking strategy ─► offers
//! ```
//!
//! Dealer and vehicle branches run as pool tasks joined through `JoinSet`s.
//! Only the downstream calls themselves occupy execution slots.
//!
//! Failure policy:
//!
//! - region info, dealer list, dealer detail: fatal, remaining branches are aborted
//! - price lookup: the vehicle is dropped
//! - discount lookup: the vehicle is priced without discount

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::query::OfferQuery;
use crate::application::services::ranking_strategy::{CheapestFirst, RankingStrategy};
use crate::domain::entities::{AggregatedOffer, Dealer, DealerVehicle, OfferKey, Region};
use crate::domain::services::pricing::final_price;
use crate::domain::value_objects::{DealerId, OfferFilter, Percent, VehicleId};
use crate::infrastructure::concurrency::context::{RequestContext, TraceId};
use crate::infrastructure::concurrency::pool::WorkerPool;
use crate::infrastructure::downstream::error::{DownstreamError, DownstreamResult};
use crate::infrastructure::downstream::traits::DownstreamClients;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{Instrument, debug, error, info, warn};

/// Default per-call timeout in milliseconds.
pub const DEFAULT_CALL_TIMEOUT_MS: u64 = 5_000;

/// Configuration for offer aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Timeout for each downstream call in milliseconds, counted from the
    /// moment the call holds an execution slot.
    pub call_timeout_ms: u64,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: DEFAULT_CALL_TIMEOUT_MS,
        }
    }
}

impl AggregationConfig {
    /// Sets the per-call timeout.
    #[must_use]
    pub fn with_call_timeout(mut self, timeout_ms: u64) -> Self {
        self.call_timeout_ms = timeout_ms;
        self
    }

    /// Returns the per-call timeout.
    #[must_use]
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}

/// Counters describing one aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationStats {
    /// Dealers whose details were fetched.
    pub dealers_queried: usize,
    /// Vehicles that passed the filter.
    pub vehicles_considered: usize,
    /// Vehicles dropped because they could not be priced.
    pub vehicles_dropped: usize,
    /// Discount lookups that succeeded.
    pub discounts_applied: usize,
    /// Discount lookups that failed and fell back to no discount.
    pub discounts_degraded: usize,
    /// Offers discarded because their key was already present.
    pub duplicates_discarded: usize,
}

/// Result of one aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationReport {
    /// Ranked offers, best first.
    pub offers: Vec<AggregatedOffer>,
    /// Counters.
    pub stats: AggregationStats,
    /// Trace id the aggregation ran under.
    pub trace_id: TraceId,
}

#[derive(Debug, Default)]
struct StatsCollector {
    dealers_queried: AtomicUsize,
    vehicles_considered: AtomicUsize,
    vehicles_dropped: AtomicUsize,
    discounts_applied: AtomicUsize,
    discounts_degraded: AtomicUsize,
    duplicates_discarded: AtomicUsize,
}

impl StatsCollector {
    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> AggregationStats {
        AggregationStats {
            dealers_queried: self.dealers_queried.load(Ordering::Relaxed),
            vehicles_considered: self.vehicles_considered.load(Ordering::Relaxed),
            vehicles_dropped: self.vehicles_dropped.load(Ordering::Relaxed),
            discounts_applied: self.discounts_applied.load(Ordering::Relaxed),
            discounts_degraded: self.discounts_degraded.load(Ordering::Relaxed),
            duplicates_discarded: self.duplicates_discarded.load(Ordering::Relaxed),
        }
    }
}

/// How a vehicle branch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VehicleOutcome {
    Inserted,
    Duplicate,
    Dropped,
}

/// Runs a downstream call on a pool slot.
///
/// The `timeout` clock starts once the call holds a slot.
async fn bounded_call<T, F>(
    pool: &WorkerPool,
    timeout: Duration,
    call: &'static str,
    future: F,
) -> DownstreamResult<T>
where
    F: Future<Output = DownstreamResult<T>> + Send + 'static,
    T: Send + 'static,
{
    match pool.execute(tokio::time::timeout(timeout, future)).await {
        Ok(Ok(result)) => result,
        Ok(Err(_elapsed)) => Err(DownstreamError::timeout_with_duration(
            format!("{call} timed out"),
            u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        )),
        Err(pool_error) => Err(DownstreamError::from(pool_error)),
    }
}

/// State shared by every branch of one aggregation.
#[derive(Debug)]
struct AggregationRun {
    region: Arc<Region>,
    filter: OfferFilter,
    clients: DownstreamClients,
    pool: WorkerPool,
    call_timeout: Duration,
    offers: DashMap<OfferKey, AggregatedOffer>,
    stats: StatsCollector,
}

impl AggregationRun {
    async fn dealer_branch(self: Arc<Self>, dealer_id: DealerId) -> ApplicationResult<()> {
        let dealers = Arc::clone(&self.clients.dealers);
        let dealer = bounded_call(&self.pool, self.call_timeout, "dealer detail", async move {
            dealers.dealer_detail(dealer_id).await
        })
        .await
        .map_err(|e| {
            error!(dealer_id = %dealer_id, error = %e, "Dealer detail lookup failed");
            ApplicationError::from_downstream("dealer", e)
        })?;
        StatsCollector::bump(&self.stats.dealers_queried);

        let dealer = Arc::new(dealer);
        let mut vehicles = JoinSet::new();
        let mut pending: HashMap<tokio::task::Id, VehicleId> = HashMap::new();

        for vehicle in dealer.vehicles().iter().filter(|v| self.filter.matches(v)) {
            StatsCollector::bump(&self.stats.vehicles_considered);
            let run = Arc::clone(&self);
            let dealer = Arc::clone(&dealer);
            let vehicle = vehicle.clone();
            let vehicle_id = vehicle.id();
            let span = tracing::debug_span!("vehicle", vehicle_id = %vehicle_id);
            let handle = self
                .pool
                .spawn_in(
                    &mut vehicles,
                    async move { run.vehicle_branch(&dealer, &vehicle).await }.instrument(span),
                )
                .map_err(|e| ApplicationError::internal(format!("cannot schedule vehicle: {e}")))?;
            pending.insert(handle.id(), vehicle_id);
        }

        while let Some(joined) = vehicles.join_next_with_id().await {
            match joined {
                Ok((id, outcome)) => {
                    pending.remove(&id);
                    debug!(?outcome, "Vehicle branch finished");
                }
                Err(join_error) => {
                    let vehicle_id = pending.remove(&join_error.id());
                    warn!(
                        dealer_id = %dealer.id(),
                        vehicle_id = ?vehicle_id.map(|v| v.get()),
                        error = %join_error,
                        "Vehicle branch failed; dropping vehicle"
                    );
                    StatsCollector::bump(&self.stats.vehicles_dropped);
                }
            }
        }
        Ok(())
    }

    async fn vehicle_branch(&self, dealer: &Dealer, vehicle: &DealerVehicle) -> VehicleOutcome {
        let vehicle_id = vehicle.id();
        let manufacturers = Arc::clone(&self.clients.manufacturers);
        let price = match bounded_call(&self.pool, self.call_timeout, "price lookup", async move {
            manufacturers.vehicle_price(vehicle_id).await
        })
        .await
        {
            Ok(price) => price,
            Err(e) => {
                warn!(vehicle_id = %vehicle_id, error = %e, "Price lookup failed; dropping vehicle");
                StatsCollector::bump(&self.stats.vehicles_dropped);
                return VehicleOutcome::Dropped;
            }
        };

        let discount = self.discount_for(vehicle, price).await;

        let final_price = match final_price(price, discount, dealer.overhead()) {
            Ok(final_price) => final_price,
            Err(e) => {
                warn!(vehicle_id = %vehicle_id, price, error = %e, "Pricing failed; dropping vehicle");
                StatsCollector::bump(&self.stats.vehicles_dropped);
                return VehicleOutcome::Dropped;
            }
        };

        let offer = AggregatedOffer::new(dealer, vehicle, final_price);
        match self.offers.entry(offer.key(self.region.code())) {
            Entry::Occupied(existing) => {
                debug!(key = %existing.key(), "Duplicate offer discarded");
                StatsCollector::bump(&self.stats.duplicates_discarded);
                VehicleOutcome::Duplicate
            }
            Entry::Vacant(slot) => {
                debug!(key = %slot.key(), final_price, "Offer priced");
                slot.insert(offer);
                VehicleOutcome::Inserted
            }
        }
    }

    /// Returns the discount for a vehicle, looking it up only when eligible.
    async fn discount_for(&self, vehicle: &DealerVehicle, price: i64) -> Percent {
        let full_type = vehicle.full_type();
        if self.region.discount_rule_for(full_type, price).is_none() {
            return Percent::ZERO;
        }

        let regions = Arc::clone(&self.clients.regions);
        let code = self.region.code().clone();
        match bounded_call(&self.pool, self.call_timeout, "discount lookup", async move {
            regions.discount_percent(&code, full_type).await
        })
        .await
        {
            Ok(percent) => {
                StatsCollector::bump(&self.stats.discounts_applied);
                percent
            }
            Err(e) => {
                warn!(
                    vehicle_id = %vehicle.id(),
                    full_type = %full_type,
                    error = %e,
                    "Discount lookup failed; pricing without discount"
                );
                StatsCollector::bump(&self.stats.discounts_degraded);
                Percent::ZERO
            }
        }
    }
}

/// Engine for collecting, pricing and ranking vehicle offers.
#[derive(Debug, Clone)]
pub struct OfferAggregationEngine {
    clients: DownstreamClients,
    pool: WorkerPool,
    ranking_strategy: Arc<dyn RankingStrategy>,
    config: AggregationConfig,
}

impl OfferAggregationEngine {
    /// Creates a new engine.
    #[must_use]
    pub fn new(
        clients: DownstreamClients,
        pool: WorkerPool,
        ranking_strategy: Arc<dyn RankingStrategy>,
        config: AggregationConfig,
    ) -> Self {
        Self {
            clients,
            pool,
            ranking_strategy,
            config,
        }
    }

    /// Creates an engine with cheapest-first ranking and default configuration.
    #[must_use]
    pub fn with_defaults(clients: DownstreamClients, pool: WorkerPool) -> Self {
        Self::new(
            clients,
            pool,
            Arc::new(CheapestFirst::new()),
            AggregationConfig::default(),
        )
    }

    /// Returns the cheapest offers for a query.
    ///
    /// # Errors
    ///
    /// See [`Self::aggregate`].
    pub async fn cheapest_offers(
        &self,
        query: &OfferQuery,
    ) -> ApplicationResult<Vec<AggregatedOffer>> {
        self.aggregate(query).await.map(|report| report.offers)
    }

    /// Collects, prices, deduplicates and ranks offers for a query.
    ///
    /// Runs under the current [`RequestContext`], or a fresh one if none is
    /// active.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::NotFound` for an unknown region or dealer,
    /// `UpstreamUnavailable` if the region, dealer list or a dealer detail
    /// lookup fails, and `Internal` if a dealer branch panics.
    pub async fn aggregate(&self, query: &OfferQuery) -> ApplicationResult<AggregationReport> {
        match RequestContext::current() {
            Some(context) => self.run(query, context.trace_id()).await,
            None => {
                let context = RequestContext::new();
                let span = context.span();
                let trace_id = context.trace_id();
                context
                    .scope(self.run(query, trace_id).instrument(span))
                    .await
            }
        }
    }

    #[tracing::instrument(
        name = "aggregate_offers",
        skip(self, query),
        fields(region = %query.region(), filter = %query.filter(), max_results = query.max_results())
    )]
    async fn run(
        &self,
        query: &OfferQuery,
        trace_id: TraceId,
    ) -> ApplicationResult<AggregationReport> {
        let call_timeout = self.config.call_timeout();
        let code = query.region().clone();

        let regions = Arc::clone(&self.clients.regions);
        let region_code = code.clone();
        let region = bounded_call(&self.pool, call_timeout, "region info", async move {
            regions.region_info(&region_code).await
        })
        .await
        .map_err(|e| {
            error!(error = %e, "Region lookup failed");
            ApplicationError::from_downstream("region", e)
        })?;

        let regions = Arc::clone(&self.clients.regions);
        let list_code = code.clone();
        let dealers = bounded_call(&self.pool, call_timeout, "dealer list", async move {
            regions.dealers_in_region(&list_code).await
        })
        .await
        .map_err(|e| {
            error!(error = %e, "Dealer list lookup failed");
            ApplicationError::from_downstream("region dealers", e)
        })?;
        debug!(dealers = dealers.len(), price_limit = region.price_limit(), "Region resolved");

        let run = Arc::new(AggregationRun {
            region: Arc::new(region),
            filter: *query.filter(),
            clients: self.clients.clone(),
            pool: self.pool.clone(),
            call_timeout,
            offers: DashMap::new(),
            stats: StatsCollector::default(),
        });

        let mut branches = JoinSet::new();
        for summary in &dealers {
            let dealer_id = summary.id();
            let span = tracing::info_span!("dealer", dealer_id = %dealer_id);
            self.pool
                .spawn_in(
                    &mut branches,
                    Arc::clone(&run).dealer_branch(dealer_id).instrument(span),
                )
                .map_err(|e| ApplicationError::internal(format!("cannot schedule dealer: {e}")))?;
        }

        // Dropping `branches` on an early return aborts the remaining dealers.
        while let Some(joined) = branches.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(e)) => return Err(e),
                Err(join_error) => {
                    error!(error = %join_error, "Dealer branch failed");
                    return Err(ApplicationError::internal(format!(
                        "dealer branch failed: {join_error}"
                    )));
                }
            }
        }

        let collected: Vec<AggregatedOffer> =
            run.offers.iter().map(|entry| entry.value().clone()).collect();
        let offers = self.ranking_strategy.rank(collected, query.max_results());
        let stats = run.stats.snapshot();

        info!(
            offers = offers.len(),
            dealers_queried = stats.dealers_queried,
            vehicles_considered = stats.vehicles_considered,
            vehicles_dropped = stats.vehicles_dropped,
            discounts_degraded = stats.discounts_degraded,
            ranking = self.ranking_strategy.name(),
            "Aggregation complete"
        );

        Ok(AggregationReport {
            offers,
            stats,
            trace_id,
        })
    }

    /// Returns the worker pool.
    #[must_use]
    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Returns the current configuration.
    #[must_use]
    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }
}
