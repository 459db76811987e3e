use std::cell::{Cell, RefCell};
use std::rc::Rc;

use mascot_agent_core::{
    Agent, AgentData, AgentError, AgentEvent, AnimationDefinition, Config, Frame, SoundMap, Task,
    TaskContext, TaskPoll,
};

fn mk_data() -> AgentData {
    let mut data = AgentData {
        framesize: [124, 93],
        overlay_count: 1,
        sounds: vec![],
        animations: Default::default(),
    };
    data.animations.insert(
        "Greeting".to_string(),
        AnimationDefinition {
            frames: vec![Frame {
                duration: 100,
                images: vec![[0, 0]],
                ..Frame::default()
            }],
            use_exit_branching: false,
        },
    );
    data
}

fn mk_agent() -> Agent {
    Agent::new(Config::default(), mk_data(), SoundMap::default())
}

/// A task with an externally controlled completion trigger that records when
/// it first starts executing.
struct TriggerTask {
    name: &'static str,
    done: Rc<Cell<bool>>,
    log: Rc<RefCell<Vec<String>>>,
    started: bool,
}

impl TriggerTask {
    fn new(name: &'static str, done: Rc<Cell<bool>>, log: Rc<RefCell<Vec<String>>>) -> Box<Self> {
        Box::new(Self {
            name,
            done,
            log,
            started: false,
        })
    }
}

impl Task for TriggerTask {
    fn poll(&mut self, _ctx: &mut TaskContext<'_>) -> TaskPoll {
        if !self.started {
            self.started = true;
            self.log.borrow_mut().push(format!("{} started", self.name));
        }
        if self.done.get() {
            TaskPoll::Complete
        } else {
            TaskPoll::Pending
        }
    }
}

struct FailingTask;

impl Task for FailingTask {
    fn poll(&mut self, _ctx: &mut TaskContext<'_>) -> TaskPoll {
        TaskPoll::Failed(AgentError::task("deliberate"))
    }
}

fn empties(events: &[AgentEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, AgentEvent::QueueEmptied))
        .count()
}

fn cleareds(events: &[AgentEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, AgentEvent::QueueCleared { .. }))
        .count()
}

/// it should execute tasks strictly in enqueue order, advancing only on completion
#[test]
fn fifo_order_gated_on_completion() {
    let mut agent = mk_agent();
    let log = Rc::new(RefCell::new(Vec::new()));
    let (a, b, c) = (
        Rc::new(Cell::new(false)),
        Rc::new(Cell::new(false)),
        Rc::new(Cell::new(false)),
    );
    agent.enqueue(TriggerTask::new("A", a.clone(), log.clone()));
    agent.enqueue(TriggerTask::new("B", b.clone(), log.clone()));
    agent.enqueue(TriggerTask::new("C", c.clone(), log.clone()));

    agent.update(0);
    assert_eq!(*log.borrow(), vec!["A started"]);

    // Intermediate polls of A must not advance the queue.
    agent.update(100);
    agent.update(100);
    assert_eq!(*log.borrow(), vec!["A started"]);

    a.set(true);
    agent.update(0);
    assert_eq!(*log.borrow(), vec!["A started", "B started"]);

    b.set(true);
    agent.update(0);
    assert_eq!(*log.borrow(), vec!["A started", "B started", "C started"]);
    assert_eq!(agent.pending_tasks(), 1);

    c.set(true);
    let out = agent.update(0);
    assert_eq!(empties(&out.events), 1);
    assert_eq!(agent.pending_tasks(), 0);
}

/// it should drop the in-flight task and the buffer on clear, fire cleared once, and accept fresh enqueues
#[test]
fn clear_mid_task_discards_pipeline() {
    let mut agent = mk_agent();
    let log = Rc::new(RefCell::new(Vec::new()));
    let a = Rc::new(Cell::new(false));
    let b = Rc::new(Cell::new(false));
    agent.enqueue(TriggerTask::new("A", a.clone(), log.clone()));
    agent.enqueue(TriggerTask::new("B", b.clone(), log.clone()));
    agent.update(0);
    assert_eq!(*log.borrow(), vec!["A started"]);

    agent.clear_queue();
    // A's completion trigger firing after the clear must have no effect.
    a.set(true);
    let out = agent.update(0);
    assert_eq!(cleareds(&out.events), 1);
    assert_eq!(empties(&out.events), 0);
    assert_eq!(agent.pending_tasks(), 0);

    // The cleared event does not repeat on later ticks.
    let out = agent.update(100);
    assert_eq!(cleareds(&out.events), 0);
    // B never started.
    assert_eq!(*log.borrow(), vec!["A started"]);

    // A fresh pipeline observes new enqueues immediately.
    let d = Rc::new(Cell::new(true));
    agent.enqueue(TriggerTask::new("D", d, log.clone()));
    let out = agent.update(0);
    assert_eq!(*log.borrow(), vec!["A started", "D started"]);
    assert_eq!(empties(&out.events), 1);
}

/// it should fire cleared once per clear call with a fresh generation each time
#[test]
fn cleared_fires_per_call() {
    let mut agent = mk_agent();
    agent.clear_queue();
    agent.clear_queue();
    let out = agent.update(0);
    assert_eq!(cleareds(&out.events), 2);
    let generations: Vec<u64> = out
        .events
        .iter()
        .filter_map(|e| match e {
            AgentEvent::QueueCleared { generation } => Some(generation.0),
            _ => None,
        })
        .collect();
    assert_eq!(generations, vec![1, 2]);
}

/// it should fire the empty event exactly once when two tasks drain
#[test]
fn empty_fires_once_for_two_tasks() {
    let mut agent = mk_agent();
    let log = Rc::new(RefCell::new(Vec::new()));
    let a = Rc::new(Cell::new(true));
    let b = Rc::new(Cell::new(true));
    agent.enqueue(TriggerTask::new("A", a, log.clone()));
    agent.enqueue(TriggerTask::new("B", b, log.clone()));

    // Both complete within the same tick; the queue drains A then B.
    let out = agent.update(0);
    assert_eq!(*log.borrow(), vec!["A started", "B started"]);
    assert_eq!(empties(&out.events), 1);
}

/// it should isolate a failing task: surface the failure and keep the pipeline alive
#[test]
fn failure_is_isolated_per_task() {
    let mut agent = mk_agent();
    let log = Rc::new(RefCell::new(Vec::new()));
    let b = Rc::new(Cell::new(true));
    agent.enqueue(Box::new(FailingTask));
    agent.enqueue(TriggerTask::new("B", b, log.clone()));

    let out = agent.update(0);
    assert!(out
        .events
        .iter()
        .any(|e| matches!(e, AgentEvent::TaskFailed { .. })));
    // B still ran and the queue drained normally.
    assert_eq!(*log.borrow(), vec!["B started"]);
    assert_eq!(empties(&out.events), 1);
    assert_eq!(agent.pending_tasks(), 0);

    // The sequencer keeps accepting work afterwards.
    let c = Rc::new(Cell::new(true));
    agent.enqueue(TriggerTask::new("C", c, log.clone()));
    let out = agent.update(0);
    assert_eq!(*log.borrow(), vec!["B started", "C started"]);
    assert_eq!(empties(&out.events), 1);
}
