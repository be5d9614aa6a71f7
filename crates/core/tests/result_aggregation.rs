use std::sync::Arc;

use anyhow::anyhow;
use fsadmin::{CommandResult, ErrorResult, ExecutionResult, Outcome, ResultSet};

fn ok(label: &str) -> Arc<dyn ExecutionResult> {
	Arc::new(Outcome::success(label.to_string()))
}

fn failed(message: &'static str) -> Arc<dyn ExecutionResult> {
	Arc::new(ErrorResult::new(anyhow!(message)))
}

fn labels(set: &ResultSet) -> Vec<String> {
	set.iter().map(ToString::to_string).collect()
}

/// Imports a batch of nodes, one result per node.
fn import_batch(nodes: &[&str], broken: Option<&'static str>) -> ResultSet {
	let mut results = ResultSet::new();
	for node in nodes {
		results.add(ok(&format!("imported {node}")));
	}
	if let Some(message) = broken {
		results.add(failed(message));
	}
	results
}

#[test]
fn nested_operations_flatten_into_one_report() {
	let templates = import_batch(&["page-template", "section-template"], None);
	let media = import_batch(&["logo.png"], Some("banner.png: unsupported format"));

	let mut all = ResultSet::new();
	all.add(Arc::new(templates.clone()));
	all.add(Arc::new(media));

	assert_eq!(
		labels(&all),
		[
			"imported page-template",
			"imported section-template",
			"imported logo.png",
			"banner.png: unsupported format"
		]
	);
	assert!(all.has_error());
	assert!(!templates.has_error());

	let result = CommandResult::from_results("Import finished with errors", all);
	let failure = result.failure().expect("import contained an error");
	assert_eq!(failure.causes(), ["banner.png: unsupported format"]);
	result.log();
}

#[test]
fn shared_entries_are_reported_once() {
	let shared = ok("store synchronized");
	let mut first = ResultSet::new();
	first.add(Arc::clone(&shared));
	first.add(ok("schedule nightly started"));

	let mut second = ResultSet::new();
	second.add(ok("schedule nightly started"));
	second.add(Arc::clone(&shared));

	let mut report = ResultSet::new();
	report.add_all([Arc::new(first) as Arc<dyn ExecutionResult>, Arc::new(second)]);

	assert_eq!(
		labels(&report),
		["store synchronized", "schedule nightly started", "schedule nightly started"]
	);
}

#[test]
fn merging_sets_that_refer_to_each_other_terminates() {
	let (r1, r2, r3) = (ok("r1"), ok("r2"), ok("r3"));
	let mut a: ResultSet = [Arc::clone(&r1)].into_iter().collect();
	let mut b: ResultSet = [Arc::clone(&r2)].into_iter().collect();
	let mut c: ResultSet = [Arc::clone(&r3)].into_iter().collect();

	a.add(Arc::new(b.clone()));
	b.add(Arc::new(c.clone()));
	c.add(Arc::new(a.clone()));
	a.add(Arc::new(c.clone()));

	assert_eq!(labels(&a), ["r1", "r2", "r3"]);
	assert_eq!(labels(&b), ["r2", "r3"]);
	assert_eq!(labels(&c), ["r3", "r1", "r2"]);
	assert!(a.contains(&r3));
}

#[test]
fn failed_command_result_merges_as_one_error_entry() {
	let failed_command: Arc<dyn ExecutionResult> = Arc::new(CommandResult::from_error(anyhow!("session refused")));
	let mut report = ResultSet::new();
	report.add(ok("module installed"));
	report.add(Arc::clone(&failed_command));

	assert_eq!(report.len(), 2);
	assert!(report.has_error());
	assert!(report.contains(&failed_command));
}
