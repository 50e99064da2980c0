use std::time::Duration;

use stepsim::models::Transition;
use stepsim::output_analysis::IndependentSample;
use stepsim::simulator::{replicate, Metrics, Network, NetworkConfig, Outcome, StopCondition};
use stepsim::utils::errors::SimulationError;

fn single_server(interarrival: f64, service: f64, stop: &str) -> String {
    format!(
        r#"
tickStep: 1.0
queues:
  - id: jobs
sources:
  - id: generator-01
    interarrival: {{uniform: {{mean: {:?}, jitter: 0.0}}}}
    target: {{queue: jobs}}
servers:
  - id: server-01
    input: {{queue: jobs}}
    serviceTime: {{uniform: {{mean: {:?}, jitter: 0.0}}}}
stop: {}
"#,
        interarrival, service, stop
    )
}

fn without_wall_clock(mut metrics: Metrics) -> Metrics {
    metrics.wall_clock_elapsed = Duration::default();
    metrics
}

#[test]
fn single_server_keeps_pace() -> Result<(), SimulationError> {
    let mut network = Network::from_yaml(&single_server(1.0, 1.0, "{processed: 10}"))?;
    let outcome = network.run()?;
    assert!(outcome.is_converged());
    let metrics = outcome.metrics();
    assert_eq!(metrics.processed, 10);
    assert_eq!(metrics.lost, 0);
    assert_eq!(metrics.generated, 10);
    assert_eq!(metrics.queue_high_water["jobs"], 1);
    assert_eq!(metrics.waiting_time_max, Some(0.0));
    assert_eq!(network.in_flight(), 0);
    Ok(())
}

#[test]
fn unbuffered_stage_loses_arrivals() -> Result<(), SimulationError> {
    let mut network = Network::from_yaml(
        r#"
tickStep: 1.0
pools:
  - id: operators
sources:
  - id: callers
    interarrival: {uniform: {mean: 1.0, jitter: 0.0}}
    quota: 5
    target: {pool: operators}
servers:
  - id: operator-01
    input: {pool: operators}
    serviceTime: {uniform: {mean: 3.0, jitter: 0.0}}
stop: {resolved: 5}
"#,
    )?;
    let metrics = network.run()?.into_metrics();
    assert!(metrics.lost > 0);
    assert_eq!(metrics.generated, 5);
    assert_eq!(metrics.lost, 2);
    assert_eq!(metrics.processed, 3);
    assert_eq!(metrics.loss_probability(), Some(0.4));
    Ok(())
}

fn accepted_by(transitions: &[(String, Transition)]) -> Vec<&str> {
    transitions
        .iter()
        .filter(|(_, transition)| *transition == Transition::Accepted)
        .map(|(id, _)| id.as_str())
        .collect()
}

#[test]
fn pool_members_are_tried_in_declaration_order() -> Result<(), SimulationError> {
    let mut network = Network::from_yaml(
        r#"
tickStep: 1.0
pools:
  - id: operators
sources:
  - id: callers
    interarrival: {uniform: {mean: 1.0, jitter: 0.0}}
    quota: 3
    target: {pool: operators}
servers:
  - id: operator-01
    input: {pool: operators}
    serviceTime: {uniform: {mean: 3.0, jitter: 0.0}}
  - id: operator-02
    input: {pool: operators}
    serviceTime: {uniform: {mean: 3.0, jitter: 0.0}}
stop: {resolved: 3}
"#,
    )?;
    // Both operators are idle, so the first declared one answers
    assert_eq!(accepted_by(&network.step()?), vec!["operator-01"]);
    assert_eq!(network.get_status("operator-02")?, "Idle");
    assert!(network.step()?.is_empty());
    // The second call overflows to the next operator in line
    assert_eq!(accepted_by(&network.step()?), vec!["operator-02"]);
    let transitions = network.step()?;
    assert_eq!(transitions.len(), 1);
    assert_eq!(transitions[0].0, "operator-01");
    assert!(matches!(transitions[0].1, Transition::Finished(_)));
    // Once free again, the first operator is preferred
    assert_eq!(accepted_by(&network.step()?), vec!["operator-01"]);
    let metrics = network.run()?.into_metrics();
    assert_eq!(metrics.processed, 3);
    assert_eq!(metrics.lost, 0);
    Ok(())
}

#[test]
fn servers_hand_finished_work_to_a_pool() -> Result<(), SimulationError> {
    let mut network = Network::from_yaml(
        r#"
tickStep: 1.0
queues:
  - id: jobs
pools:
  - id: specialists
sources:
  - id: generator-01
    interarrival: {uniform: {mean: 2.0, jitter: 0.0}}
    quota: 3
    target: {queue: jobs}
servers:
  - id: specialist-01
    input: {pool: specialists}
    serviceTime: {uniform: {mean: 3.0, jitter: 0.0}}
  - id: specialist-02
    input: {pool: specialists}
    serviceTime: {uniform: {mean: 3.0, jitter: 0.0}}
  - id: front-desk
    input: {queue: jobs}
    serviceTime: {uniform: {mean: 1.0, jitter: 0.0}}
    output: {pool: specialists}
stop: {processed: 3}
"#,
    )?;
    assert_eq!(accepted_by(&network.step()?), vec!["front-desk"]);
    let transitions = network.step()?;
    assert_eq!(transitions.len(), 1);
    assert_eq!(transitions[0].0, "front-desk");
    assert!(matches!(transitions[0].1, Transition::Finished(_)));
    // The specialists already moved this tick, so the item waits in the
    // first one's hand-off slot
    assert_eq!(network.get_status("specialist-01")?, "Reserved");
    assert_eq!(network.get_status("specialist-02")?, "Idle");
    assert_eq!(network.in_flight(), 1);
    assert_eq!(accepted_by(&network.step()?), vec!["specialist-01"]);
    assert_eq!(network.get_status("specialist-01")?, "Processing");
    network.step_n(2)?;
    assert_eq!(network.get_status("specialist-02")?, "Reserved");
    let metrics = network.run()?.into_metrics();
    assert_eq!(metrics.generated, 3);
    assert_eq!(metrics.processed, 3);
    assert_eq!(metrics.lost, 0);
    assert_eq!(network.in_flight(), 0);
    Ok(())
}

#[test]
fn routing_follows_kind_weights() -> Result<(), SimulationError> {
    let mut network = Network::from_yaml(
        r#"
tickStep: 1.0
kinds: [economy, comfort]
queues:
  - id: orders
  - id: economy-queue
  - id: comfort-queue
sources:
  - id: passengers
    interarrival: {uniform: {mean: 1.0, jitter: 0.0}}
    kindWeights: [80, 20]
    target: {queue: orders}
routers:
  - id: dispatcher
    input: {queue: orders}
    routingTime: {uniform: {mean: 1.0, jitter: 0.0}}
    routes:
      economy: {queue: economy-queue}
      comfort: {queue: comfort-queue}
servers:
  - id: economy-car
    input: {queue: economy-queue}
    serviceTime: {uniform: {mean: 1.0, jitter: 0.0}}
  - id: comfort-car
    input: {queue: comfort-queue}
    serviceTime: {uniform: {mean: 1.0, jitter: 0.0}}
stop: {processed: 1000}
"#,
    )?;
    let metrics = network.run()?.into_metrics();
    assert_eq!(metrics.processed, 1000);
    let economy = metrics.queue_admissions["economy-queue"] as f64;
    let comfort = metrics.queue_admissions["comfort-queue"] as f64;
    let ratio = economy / (economy + comfort);
    assert!((ratio - 0.8).abs() < 0.05, "economy ratio was {}", ratio);
    assert!(metrics.queue_admissions["orders"] >= 1000);
    Ok(())
}

#[test]
fn items_are_conserved_on_every_tick() -> Result<(), SimulationError> {
    let mut network = Network::from_yaml(
        r#"
tickStep: 0.1
seed: 11
pools:
  - id: front-desk
queues:
  - id: back-office
    capacity: 4
sources:
  - id: visitors
    interarrival: {normal: {mean: 1.0, jitter: 0.6}}
    target: {pool: front-desk}
servers:
  - id: clerk-01
    input: {pool: front-desk}
    serviceTime: {uniform: {mean: 1.5, jitter: 1.0}}
    output: {queue: back-office}
  - id: clerk-02
    input: {pool: front-desk}
    serviceTime: {exp: {mean: 2.0}}
    output: {queue: back-office}
  - id: manager
    input: {queue: back-office}
    serviceTime: {exp: {mean: 0.9}}
    repeatProbability: 0.1
stop: {elapsed: 200.0}
"#,
    )?;
    for _ in 0..2000 {
        network.step()?;
        let metrics = network.get_metrics();
        assert_eq!(
            metrics.generated,
            metrics.processed + metrics.lost + network.in_flight()
        );
        assert!(metrics.queue_high_water["back-office"] <= 4);
    }
    let metrics = network.get_metrics();
    assert!(metrics.generated > 150);
    assert!(metrics.processed > 0);
    assert!(metrics.waiting_time_min.unwrap_or(0.0) >= 0.0);
    Ok(())
}

#[test]
fn single_queue_is_served_in_arrival_order() -> Result<(), SimulationError> {
    let mut network = Network::from_yaml(
        r#"
tickStep: 0.5
queues:
  - id: jobs
sources:
  - id: generator-01
    interarrival: {exp: {mean: 1.0}}
    target: {queue: jobs}
servers:
  - id: server-01
    input: {queue: jobs}
    serviceTime: {exp: {mean: 1.2}}
stop: {processed: 100}
"#,
    )?;
    let finished: Vec<u64> = network
        .step_n(1000)?
        .into_iter()
        .filter_map(|(entity_id, transition)| match transition {
            Transition::Finished(emission) if entity_id == "server-01" => {
                Some(emission.item.id())
            }
            _ => None,
        })
        .collect();
    assert!(finished.len() > 100);
    assert!(finished.windows(2).all(|pair| pair[0] < pair[1]));
    Ok(())
}

#[test]
fn waiting_time_grows_behind_a_slow_server() -> Result<(), SimulationError> {
    let mut config = NetworkConfig::from_yaml(&single_server(1.0, 3.0, "{processed: 5}"))?;
    config.sla_threshold = Some(2.0);
    let metrics = Network::post(&config)?.run()?.into_metrics();
    // Items arrive every 2 ticks and are served every 4
    assert_eq!(metrics.processed, 5);
    assert_eq!(metrics.waiting_time_min, Some(0.0));
    assert_eq!(metrics.waiting_time_max, Some(8.0));
    assert_eq!(metrics.waiting_time_sum, 20.0);
    assert_eq!(metrics.mean_waiting_time(), Some(4.0));
    assert_eq!(metrics.missed_sla, 3);
    assert_eq!(metrics.missed_sla_ratio(), Some(0.6));
    assert!(metrics.queue_high_water["jobs"] >= 3);
    Ok(())
}

#[test]
fn runs_replay_identically_for_a_seed() -> Result<(), SimulationError> {
    let yaml = r#"
tickStep: 0.1
seed: 2024
kinds: [small, large]
queues:
  - id: intake
  - id: small-jobs
  - id: large-jobs
sources:
  - id: generator-01
    interarrival: {uniform: {mean: 1.0, jitter: 0.5}}
    kindWeights: [3, 1]
    target: {queue: intake}
routers:
  - id: router-01
    input: {queue: intake}
    routingTime: {normal: {mean: 0.2, jitter: 0.1}}
    routes:
      small: {queue: small-jobs}
      large: {queue: large-jobs}
servers:
  - id: small-server
    input: {queue: small-jobs}
    serviceTime: {exp: {mean: 0.8}}
  - id: large-server
    input: {queue: large-jobs}
    serviceTime: {exp: {mean: 2.5}}
slaThreshold: 1.0
stop: {processed: 300}
"#;
    let first = Network::from_yaml(yaml)?.run()?.into_metrics();
    let second = Network::from_yaml(yaml)?.run()?.into_metrics();
    assert_eq!(without_wall_clock(first), without_wall_clock(second));
    Ok(())
}

#[test]
fn unreachable_stop_condition_does_not_converge() -> Result<(), SimulationError> {
    let mut network = Network::from_yaml(
        r#"
tickStep: 1.0
maxTicks: 100
queues:
  - id: jobs
sources:
  - id: generator-01
    interarrival: {uniform: {mean: 1.0, jitter: 0.0}}
    quota: 5
    target: {queue: jobs}
servers:
  - id: server-01
    input: {queue: jobs}
    serviceTime: {uniform: {mean: 1.0, jitter: 0.0}}
stop: {processed: 10}
"#,
    )?;
    match network.run()? {
        Outcome::DidNotConverge(metrics) => {
            assert_eq!(metrics.processed, 5);
            assert_eq!(metrics.ticks, 100);
        }
        Outcome::Completed(metrics) => panic!("expected non-convergence, found {:?}", metrics),
    }
    assert_eq!(network.get_status("generator-01")?, "Exhausted");
    Ok(())
}

#[test]
fn satisfied_stop_condition_runs_no_ticks() -> Result<(), SimulationError> {
    let mut network = Network::from_yaml(&single_server(1.0, 1.0, "{resolved: 0}"))?;
    let outcome = network.run()?;
    assert!(outcome.is_converged());
    assert_eq!(outcome.metrics().ticks, 0);
    assert_eq!(network.get_global_time(), 0.0);
    Ok(())
}

#[test]
fn repeated_work_is_not_processed_twice() -> Result<(), SimulationError> {
    let mut network = Network::from_yaml(
        r#"
tickStep: 0.1
queues:
  - id: tasks
sources:
  - id: generator-01
    interarrival: {uniform: {mean: 1.0, jitter: 0.0}}
    target: {queue: tasks}
servers:
  - id: processor-01
    input: {queue: tasks}
    serviceTime: {uniform: {mean: 0.3, jitter: 0.1}}
    repeatProbability: 0.3
stop: {processed: 200}
"#,
    )?;
    let metrics = network.run()?.into_metrics();
    assert_eq!(metrics.processed, 200);
    assert!(metrics.repeated > 30);
    assert_eq!(
        metrics.generated,
        metrics.processed + metrics.lost + network.in_flight()
    );
    assert!(metrics.queue_admissions["tasks"] >= metrics.processed + metrics.repeated);
    Ok(())
}

#[test]
fn operators_feed_computer_queues() -> Result<(), SimulationError> {
    let mut network = Network::from_yaml(
        r#"
tickStep: 0.1
maxTicks: 200000
pools:
  - id: operators
queues:
  - id: computer-1-queue
  - id: computer-2-queue
sources:
  - id: clients
    interarrival: {uniform: {mean: 10.0, jitter: 2.0}}
    quota: 300
    target: {pool: operators}
servers:
  - id: operator-1
    input: {pool: operators}
    serviceTime: {uniform: {mean: 20.0, jitter: 5.0}}
    output: {queue: computer-1-queue}
  - id: operator-2
    input: {pool: operators}
    serviceTime: {uniform: {mean: 40.0, jitter: 10.0}}
    output: {queue: computer-1-queue}
  - id: operator-3
    input: {pool: operators}
    serviceTime: {uniform: {mean: 40.0, jitter: 20.0}}
    output: {queue: computer-2-queue}
  - id: computer-1
    input: {queue: computer-1-queue}
    serviceTime: {uniform: {mean: 15.0, jitter: 0.0}}
  - id: computer-2
    input: {queue: computer-2-queue}
    serviceTime: {uniform: {mean: 30.0, jitter: 0.0}}
stop: {resolved: 300}
"#,
    )?;
    let outcome = network.run()?;
    assert!(outcome.is_converged());
    let metrics = outcome.metrics();
    assert_eq!(metrics.generated, 300);
    assert_eq!(metrics.processed + metrics.lost, 300);
    let loss = metrics.loss_probability().unwrap_or(0.0);
    assert!(loss > 0.0 && loss < 0.5, "loss probability was {}", loss);
    assert_eq!(network.in_flight(), 0);
    Ok(())
}

#[test]
fn bounded_queue_rejects_overflow() -> Result<(), SimulationError> {
    let mut config = NetworkConfig::from_yaml(&single_server(1.0, 5.0, "{resolved: 20}"))?;
    config.queues[0].capacity = Some(2);
    let metrics = Network::post(&config)?.run()?.into_metrics();
    assert!(metrics.lost > 0);
    assert_eq!(metrics.queue_high_water["jobs"], 2);
    assert_eq!(metrics.processed + metrics.lost, 20);
    Ok(())
}

#[test]
fn network_introspection() -> Result<(), SimulationError> {
    let mut network = Network::from_yaml(&single_server(1.0, 3.0, "{processed: 5}"))?;
    assert_eq!(network.get_status("server-01")?, "Idle");
    let transitions = network.step()?;
    assert_eq!(transitions.len(), 2);
    assert_eq!(network.get_status("server-01")?, "Processing");
    assert_eq!(network.get_status("generator-01")?, "Generating");
    assert_eq!(network.get_global_time(), 1.0);
    assert_eq!(network.queue_len("jobs")?, 0);
    assert_eq!(network.in_flight(), 1);
    network.step_n(4)?;
    assert_eq!(network.queue_len("jobs")?, 1);
    assert!(matches!(
        network.get_status("server-02"),
        Err(SimulationError::EntityNotFound(_))
    ));
    assert!(matches!(
        network.queue_len("backlog"),
        Err(SimulationError::QueueNotFound(_))
    ));
    Ok(())
}

#[test]
fn run_until_overrides_the_configured_stop() -> Result<(), SimulationError> {
    let mut network = Network::from_yaml(&single_server(1.0, 1.0, "{processed: 10}"))?;
    let outcome = network.run_until(&StopCondition::Elapsed(6.0))?;
    assert_eq!(outcome.metrics().ticks, 6);
    assert_eq!(outcome.metrics().generated, 3);
    Ok(())
}

#[test]
fn replications_summarize_across_seeds() -> Result<(), SimulationError> {
    let config = NetworkConfig::from_yaml(
        r#"
tickStep: 0.1
queues:
  - id: jobs
sources:
  - id: generator-01
    interarrival: {exp: {mean: 1.0}}
    target: {queue: jobs}
servers:
  - id: server-01
    input: {queue: jobs}
    serviceTime: {exp: {mean: 0.7}}
stop: {processed: 200}
"#,
    )?;
    let outcomes = replicate(&config, &[1, 2, 3, 4, 5])?;
    assert_eq!(outcomes.len(), 5);
    assert!(outcomes.iter().all(Outcome::is_converged));
    let mean_waits = outcomes
        .iter()
        .map(|outcome| outcome.metrics().mean_waiting_time().unwrap_or(0.0))
        .collect();
    let sample = IndependentSample::post(mean_waits)?;
    assert!(sample.point_estimate_mean() > 0.0);
    assert!(sample.min() <= sample.max());
    assert!(sample.standard_error()? >= 0.0);
    Ok(())
}
