use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use exam_score_rank::error::IdentityField;
use exam_score_rank::models::{CertResult, CertificateGrade};
use exam_score_rank::utils::Progress;
use exam_score_rank::{
    App, Config, ExtractionError, FetchError, Identity, IdentityExtractor, ResultRecord,
    ResultsFetcher, RetryPolicy,
};

/// 按文件名返回身份信息；没有登记的文件视为缺少身份证号
#[derive(Default)]
struct FakeExtractor {
    identities: HashMap<String, Identity>,
    delay: Option<Duration>,
    panic_once: Mutex<Vec<String>>,
    calls: Mutex<HashMap<String, usize>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeExtractor {
    fn with(mut self, file_name: &str, name: &str, national_id: &str, ticket: &str) -> Self {
        self.identities.insert(
            file_name.to_string(),
            Identity {
                name: name.to_string(),
                national_id: national_id.to_string(),
                exam_ticket_number: ticket.to_string(),
            },
        );
        self
    }

    fn calls_for(&self, file_name: &str) -> usize {
        self.calls.lock().unwrap().get(file_name).copied().unwrap_or(0)
    }
}

#[async_trait]
impl IdentityExtractor for FakeExtractor {
    async fn extract(&self, path: &Path) -> Result<Identity, ExtractionError> {
        let file_name = path.file_name().unwrap().to_string_lossy().into_owned();
        *self.calls.lock().unwrap().entry(file_name.clone()).or_default() += 1;

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let should_panic = {
            let mut pending = self.panic_once.lock().unwrap();
            match pending.iter().position(|f| f == &file_name) {
                Some(pos) => {
                    pending.remove(pos);
                    true
                }
                None => false,
            }
        };
        if should_panic {
            panic!("模拟解析崩溃: {file_name}");
        }

        self.identities
            .get(&file_name)
            .cloned()
            .ok_or(ExtractionError::IncompleteIdentity {
                missing: vec![IdentityField::NationalId],
            })
    }
}

/// 按身份证号返回成绩；`failures_left` 中的身份证号先失败若干次
#[derive(Default)]
struct FakeFetcher {
    records: HashMap<String, Vec<ResultRecord>>,
    failures_left: Mutex<HashMap<String, usize>>,
    calls: AtomicUsize,
}

impl FakeFetcher {
    fn with(mut self, national_id: &str, records: Vec<ResultRecord>) -> Self {
        self.records.insert(national_id.to_string(), records);
        self
    }

    fn failing(self, national_id: &str, times: usize) -> Self {
        self.failures_left
            .lock()
            .unwrap()
            .insert(national_id.to_string(), times);
        self
    }
}

#[async_trait]
impl ResultsFetcher for FakeFetcher {
    async fn fetch_results(
        &self,
        national_id: &str,
        _exam_ticket_number: &str,
    ) -> Result<Vec<ResultRecord>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        {
            let mut failures = self.failures_left.lock().unwrap();
            if let Some(left) = failures.get_mut(national_id) {
                if *left > 0 {
                    *left -= 1;
                    return Err(FetchError::MissingData {
                        endpoint: "fake".to_string(),
                    });
                }
            }
        }
        Ok(self.records.get(national_id).cloned().unwrap_or_default())
    }
}

fn record(label: &str, score: &str) -> ResultRecord {
    ResultRecord {
        cert_result: CertResult {
            label: label.to_string(),
        },
        plan_name: "2024年6月Web前端开发职业技能等级证书考试".to_string(),
        certificate_name: "Web前端开发职业技能等级证书".to_string(),
        score: score.to_string(),
        certificate_grade: CertificateGrade {
            msg: "中级".to_string(),
        },
    }
}

fn ticket_dir(file_names: &[&str]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for name in file_names {
        std::fs::write(dir.path().join(name), b"%PDF-1.4").unwrap();
    }
    dir
}

fn fast_config(max_attempts: u32) -> Config {
    Config {
        max_attempts,
        retry_base_delay_ms: 1,
        retry_max_delay_ms: 5,
        ..Config::default()
    }
}

fn build_app(config: Config, extractor: Arc<FakeExtractor>, fetcher: Arc<FakeFetcher>) -> App {
    App::with_services(config, extractor, fetcher, Progress::disabled())
}

#[tokio::test]
async fn test_two_tickets_ranked_by_score() {
    let dir = ticket_dir(&["a.pdf", "b.pdf"]);
    let extractor = Arc::new(
        FakeExtractor::default()
            .with("a.pdf", "张三", "110101200001010011", "2406110001")
            .with("b.pdf", "李四", "110101200001010022", "2406110002"),
    );
    let fetcher = Arc::new(
        FakeFetcher::default()
            // B 先登记，确保排名不依赖输入顺序
            .with("110101200001010022", vec![record("未通过", "60.00")])
            .with("110101200001010011", vec![record("已通过", "85.00")]),
    );

    let report = build_app(fast_config(3), extractor, fetcher)
        .run(dir.path())
        .await
        .unwrap();

    assert!(report.is_complete());
    assert_eq!(report.entries.len(), 2);
    assert_eq!(report.entries[0].name, "张三");
    assert_eq!(report.entries[0].result.cert_result_label(), "已通过");
    assert_eq!(report.entries[1].name, "李四");
    assert_eq!(report.entries[1].result.cert_result_label(), "未通过");

    let text = report.render(false);
    assert!(text.contains("[1]\t张三\t已通过\t85.00"));
    assert!(text.contains("[2]\t李四\t未通过\t60.00"));
    assert_eq!(text, report.render(false));
}

#[tokio::test]
async fn test_one_ticket_with_several_sittings() {
    let dir = ticket_dir(&["a.pdf"]);
    let extractor = Arc::new(FakeExtractor::default().with("a.pdf", "王五", "1", "Z1"));
    let fetcher = Arc::new(FakeFetcher::default().with(
        "1",
        vec![record("未通过", "39.00"), record("已通过", "72.00")],
    ));

    let report = build_app(fast_config(3), extractor, fetcher)
        .run(dir.path())
        .await
        .unwrap();

    let scores: Vec<_> = report.entries.iter().map(|e| e.result.score.as_str()).collect();
    assert_eq!(scores, vec!["72.00", "39.00"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unbounded_retry_never_drains() {
    let dir = ticket_dir(&["missing-id.pdf"]);
    let extractor = Arc::new(FakeExtractor::default());
    let fetcher = Arc::new(FakeFetcher::default());

    let app = build_app(Config::default(), extractor.clone(), fetcher)
        .with_retry_policy(RetryPolicy::unbounded());

    let result = tokio::time::timeout(Duration::from_millis(300), app.run(dir.path())).await;
    assert!(result.is_err(), "没有任何准考证成功时不应输出排名");
    assert!(extractor.calls_for("missing-id.pdf") > 1);
}

#[tokio::test]
async fn test_bounded_retry_reports_permanent_failure() {
    let dir = ticket_dir(&["good.pdf", "missing-id.pdf"]);
    let extractor = Arc::new(FakeExtractor::default().with("good.pdf", "张三", "1", "Z1"));
    let fetcher = Arc::new(FakeFetcher::default().with("1", vec![record("已通过", "90.00")]));

    let report = build_app(fast_config(3), extractor.clone(), fetcher)
        .run(dir.path())
        .await
        .unwrap();

    assert_eq!(report.entries.len(), 1);
    assert_eq!(report.failures.len(), 1);
    let failed = &report.failures[0];
    assert!(failed.file.ends_with("missing-id.pdf"));
    assert_eq!(failed.attempts, 3);
    assert!(failed.last_error.contains("身份证号"));
    assert_eq!(extractor.calls_for("missing-id.pdf"), 3);
    assert_eq!(extractor.calls_for("good.pdf"), 1);

    assert!(report.render(false).contains("missing-id.pdf\t尝试 3 次"));
}

#[tokio::test]
async fn test_transient_fetch_failure_is_retried() {
    let dir = ticket_dir(&["a.pdf"]);
    let extractor = Arc::new(FakeExtractor::default().with("a.pdf", "张三", "1", "Z1"));
    let fetcher = Arc::new(
        FakeFetcher::default()
            .with("1", vec![record("已通过", "88.00")])
            .failing("1", 2),
    );

    let report = build_app(fast_config(5), extractor.clone(), fetcher.clone())
        .run(dir.path())
        .await
        .unwrap();

    assert!(report.is_complete());
    assert_eq!(report.entries.len(), 1);
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
    assert_eq!(extractor.calls_for("a.pdf"), 3);
}

#[tokio::test]
async fn test_panicking_attempt_is_retried() {
    let dir = ticket_dir(&["a.pdf"]);
    let extractor = FakeExtractor::default().with("a.pdf", "张三", "1", "Z1");
    extractor.panic_once.lock().unwrap().push("a.pdf".to_string());
    let extractor = Arc::new(extractor);
    let fetcher = Arc::new(FakeFetcher::default().with("1", vec![record("已通过", "88.00")]));

    let report = build_app(fast_config(3), extractor.clone(), fetcher)
        .run(dir.path())
        .await
        .unwrap();

    assert!(report.is_complete());
    assert_eq!(report.entries.len(), 1);
    assert_eq!(extractor.calls_for("a.pdf"), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrency_ceiling_is_respected() {
    let names: Vec<String> = (0..20).map(|i| format!("{i:02}.pdf")).collect();
    let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let dir = ticket_dir(&name_refs);

    let mut extractor = FakeExtractor {
        delay: Some(Duration::from_millis(20)),
        ..FakeExtractor::default()
    };
    let mut fetcher = FakeFetcher::default();
    for (i, name) in names.iter().enumerate() {
        let id = format!("ID{i}");
        extractor = extractor.with(name, &format!("考生{i:02}"), &id, &format!("Z{i}"));
        fetcher = fetcher.with(&id, vec![record("已通过", &format!("{}.00", 50 + i))]);
    }
    let extractor = Arc::new(extractor);

    let config = Config {
        max_concurrent_tasks: 5,
        ..fast_config(3)
    };
    let report = build_app(config, extractor.clone(), Arc::new(fetcher))
        .run(dir.path())
        .await
        .unwrap();

    assert_eq!(report.entries.len(), 20);
    assert_eq!(report.entries[0].name, "考生19");
    let max = extractor.max_in_flight.load(Ordering::SeqCst);
    assert!(max <= 5, "同时进行的任务数 {max} 超过上限");
    assert!(max >= 1);
}

#[tokio::test]
async fn test_invalid_directory_is_rejected_before_any_task() {
    let dir = tempfile::tempdir().unwrap();
    let extractor = Arc::new(FakeExtractor::default());
    let app = build_app(fast_config(3), extractor.clone(), Arc::new(FakeFetcher::default()));

    let err = app.run(&dir.path().join("不存在")).await.unwrap_err();
    assert!(matches!(err, exam_score_rank::AppError::Directory(_)));
    assert_eq!(extractor.calls.lock().unwrap().len(), 0);
}

#[tokio::test]
async fn test_empty_directory_produces_empty_report() {
    let dir = tempfile::tempdir().unwrap();
    let report = build_app(
        fast_config(3),
        Arc::new(FakeExtractor::default()),
        Arc::new(FakeFetcher::default()),
    )
    .run(dir.path())
    .await
    .unwrap();

    assert!(report.entries.is_empty());
    assert!(report.render(false).contains("没有查询到任何成绩记录"));
}
