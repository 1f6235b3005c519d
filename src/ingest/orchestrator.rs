use tracing::{debug, info, warn};

use super::normalizer::normalize;
use super::reconciler::{Reconciler, ResolveMode};
use super::unit_of_work::UnitOfWork;
use super::{CatalogGateway, CatalogLookup, IngestError, IngestReport, ShowSource};
use crate::clients::tvmaze::RawShow;

/// Fetches the show list and stores every show not seen before, committing
/// once for the whole batch.
///
/// Shows that already exist are skipped, never updated. Any failure aborts
/// the run before the commit, so a failed run writes nothing.
pub async fn run_ingestion(
    source: &dyn ShowSource,
    gateway: &dyn CatalogGateway,
) -> Result<IngestReport, IngestError> {
    metrics::counter!("ingest_runs_total").increment(1);

    let records = source.fetch_shows().await.map_err(|e| {
        warn!("Show source fetch failed: {}", e);
        IngestError::from(e)
    })?;

    let mut work = UnitOfWork::new();
    let report = ingest_records(records, gateway, &mut work).await?;

    metrics::counter!("ingest_shows_skipped_total").increment(report.skipped as u64);

    if work.staged_show_count() == 0 {
        info!(
            "Ingestion finished: {} fetched, nothing new to store",
            report.fetched
        );
        return Ok(report);
    }

    let written = gateway.commit(work).await?;
    debug!("Committed {} shows", written);
    metrics::counter!("ingest_shows_created_total").increment(report.created as u64);

    info!(
        "Ingestion finished: {} fetched, {} created, {} skipped",
        report.fetched, report.created, report.skipped
    );
    Ok(report)
}

/// Stages every record that is neither stored nor already staged. Records are
/// handled strictly in input order.
pub async fn ingest_records<L: CatalogLookup + ?Sized>(
    records: Vec<RawShow>,
    lookup: &L,
    work: &mut UnitOfWork,
) -> Result<IngestReport, IngestError> {
    let reconciler = Reconciler::new(lookup, ResolveMode::ReuseExisting);
    let mut report = IngestReport {
        fetched: records.len(),
        ..IngestReport::default()
    };

    for (index, record) in records.into_iter().enumerate() {
        let show = normalize(record, index)?;

        if work.has_staged_show(show.id) || reconciler.show_exists(show.id).await? {
            debug!("Skipping show {}: already ingested", show.id);
            report.skipped += 1;
            continue;
        }

        let staged = reconciler.reconcile_show(work, show).await?;
        work.stage_show_insert(staged);
        report.created += 1;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::tvmaze::{RawCountry, RawNetwork, SourceError};
    use crate::entities::{countries, genres, networks};
    use crate::ingest::reconciler::tests::FakeCatalog;
    use crate::ingest::{GenreHandle, NetworkHandle};
    use sea_orm::DbErr;
    use std::sync::Mutex;

    struct FixedSource(Result<Vec<RawShow>, u16>);

    #[async_trait::async_trait]
    impl ShowSource for FixedSource {
        async fn fetch_shows(&self) -> Result<Vec<RawShow>, SourceError> {
            match &self.0 {
                Ok(records) => Ok(records.clone()),
                Err(status) => Err(SourceError::Upstream {
                    url: "http://upstream/shows".to_string(),
                    status: *status,
                }),
            }
        }
    }

    /// Records what would have been committed.
    #[derive(Default)]
    struct RecordingGateway {
        catalog: FakeCatalog,
        commits: Mutex<Vec<Vec<i32>>>,
    }

    #[async_trait::async_trait]
    impl CatalogLookup for RecordingGateway {
        async fn show_exists(&self, id: i32) -> Result<bool, DbErr> {
            self.catalog.show_exists(id).await
        }

        async fn find_network(&self, id: i32) -> Result<Option<networks::Model>, DbErr> {
            self.catalog.find_network(id).await
        }

        async fn find_country(&self, code: &str) -> Result<Option<countries::Model>, DbErr> {
            self.catalog.find_country(code).await
        }

        async fn find_genre(&self, name: &str) -> Result<Option<genres::Model>, DbErr> {
            self.catalog.find_genre(name).await
        }
    }

    #[async_trait::async_trait]
    impl CatalogGateway for RecordingGateway {
        async fn commit(&self, work: UnitOfWork) -> Result<usize, DbErr> {
            let ids: Vec<i32> = work.show_inserts().iter().map(|s| s.id).collect();
            let count = ids.len();
            self.commits.lock().unwrap().push(ids);
            Ok(count)
        }
    }

    fn show(id: i32, genres: &[&str]) -> RawShow {
        RawShow {
            id: Some(id),
            name: Some(format!("Show {id}")),
            genres: Some(genres.iter().map(|g| Some((*g).to_string())).collect()),
            ..Default::default()
        }
    }

    fn on_network(mut record: RawShow, network_id: i32) -> RawShow {
        record.network = Some(RawNetwork {
            id: Some(network_id),
            name: Some("CBS".to_string()),
            country: Some(RawCountry {
                name: Some("United States".to_string()),
                code: Some("US".to_string()),
                timezone: Some("America/New_York".to_string()),
            }),
        });
        record
    }

    #[tokio::test]
    async fn shared_genre_is_staged_once() {
        let catalog = FakeCatalog::default();
        let mut work = UnitOfWork::new();

        let report = ingest_records(
            vec![show(1, &["Drama"]), show(2, &["Drama"])],
            &catalog,
            &mut work,
        )
        .await
        .unwrap();

        assert_eq!(report.created, 2);
        assert_eq!(work.staged_genre_count(), 1);
        for staged in work.show_inserts() {
            assert_eq!(staged.genres, vec![GenreHandle::Staged(0)]);
        }
    }

    #[tokio::test]
    async fn shows_on_same_network_share_one_row() {
        let catalog = FakeCatalog::default();
        let mut work = UnitOfWork::new();

        ingest_records(
            vec![on_network(show(1, &[]), 2), on_network(show(2, &[]), 2)],
            &catalog,
            &mut work,
        )
        .await
        .unwrap();

        assert_eq!(work.staged_network_count(), 1);
        assert_eq!(work.staged_country_count(), 1);
        let networks: Vec<_> = work.show_inserts().iter().map(|s| s.network).collect();
        assert_eq!(networks, vec![Some(NetworkHandle::Staged(0)); 2]);
    }

    #[tokio::test]
    async fn existing_and_repeated_shows_are_skipped() {
        let catalog = FakeCatalog {
            shows: vec![1],
            ..Default::default()
        };
        let mut work = UnitOfWork::new();

        let report = ingest_records(
            vec![show(1, &[]), show(2, &[]), show(2, &[])],
            &catalog,
            &mut work,
        )
        .await
        .unwrap();

        assert_eq!(
            report,
            IngestReport {
                fetched: 3,
                created: 1,
                skipped: 2
            }
        );
        assert_eq!(work.show_inserts()[0].id, 2);
    }

    #[tokio::test]
    async fn missing_id_aborts_batch() {
        let catalog = FakeCatalog::default();
        let mut broken = show(0, &[]);
        broken.id = None;

        let gateway = RecordingGateway {
            catalog,
            ..Default::default()
        };
        let source = FixedSource(Ok(vec![show(1, &[]), broken]));

        let err = run_ingestion(&source, &gateway).await.unwrap_err();

        assert!(matches!(err, IngestError::MalformedRecord { index: 1 }));
        assert!(gateway.commits.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn nothing_new_means_no_commit() {
        let gateway = RecordingGateway {
            catalog: FakeCatalog {
                shows: vec![1],
                ..Default::default()
            },
            ..Default::default()
        };

        let report = run_ingestion(&FixedSource(Ok(vec![show(1, &[])])), &gateway)
            .await
            .unwrap();
        assert_eq!(report.skipped, 1);

        let report = run_ingestion(&FixedSource(Ok(Vec::new())), &gateway)
            .await
            .unwrap();
        assert_eq!(report, IngestReport::default());

        assert!(gateway.commits.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn new_shows_are_committed_once() {
        let gateway = RecordingGateway::default();
        let source = FixedSource(Ok(vec![show(1, &["Drama"]), show(2, &["Drama"])]));

        let report = run_ingestion(&source, &gateway).await.unwrap();

        assert_eq!(report.created, 2);
        assert_eq!(*gateway.commits.lock().unwrap(), vec![vec![1, 2]]);
    }

    #[tokio::test]
    async fn storage_failure_mid_batch_aborts_without_commit() {
        let gateway = RecordingGateway {
            catalog: FakeCatalog {
                fail_on_show: Some(2),
                ..Default::default()
            },
            ..Default::default()
        };
        let source = FixedSource(Ok(vec![
            show(1, &["Drama"]),
            show(2, &["Drama"]),
            show(3, &["Comedy"]),
        ]));

        let err = run_ingestion(&source, &gateway).await.unwrap_err();

        assert!(matches!(err, IngestError::Storage(_)));
        assert!(gateway.commits.lock().unwrap().is_empty());
    }

    #[test]
    fn skipped_counter_moves_even_without_commit() {
        use metrics_exporter_prometheus::PrometheusBuilder;

        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let gateway = RecordingGateway {
            catalog: FakeCatalog {
                shows: vec![1, 2],
                ..Default::default()
            },
            ..Default::default()
        };
        let source = FixedSource(Ok(vec![show(1, &[]), show(2, &[])]));
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let report = metrics::with_local_recorder(&recorder, || {
            runtime.block_on(run_ingestion(&source, &gateway))
        })
        .unwrap();

        assert_eq!(report.skipped, 2);
        assert!(gateway.commits.lock().unwrap().is_empty());
        let rendered = handle.render();
        assert!(rendered.contains("ingest_runs_total 1"), "{rendered}");
        assert!(rendered.contains("ingest_shows_skipped_total 2"), "{rendered}");
    }

    #[tokio::test]
    async fn upstream_failure_is_propagated() {
        let gateway = RecordingGateway::default();

        let err = run_ingestion(&FixedSource(Err(500)), &gateway)
            .await
            .unwrap_err();

        assert!(matches!(err, IngestError::Upstream { status: 500 }));
        assert!(gateway.commits.lock().unwrap().is_empty());
    }
}
