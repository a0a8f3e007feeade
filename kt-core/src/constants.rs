// Owner kinds
pub const DEPLOYMENT_KIND: &str = "Deployment";
pub const REPLICASET_KIND: &str = "ReplicaSet";
pub const STATEFULSET_KIND: &str = "StatefulSet";
pub const DAEMONSET_KIND: &str = "DaemonSet";
pub const JOB_KIND: &str = "Job";

// Pod phases and condition types
pub const POD_PHASE_RUNNING: &str = "Running";
pub const POD_PHASE_SUCCEEDED: &str = "Succeeded";
pub const POD_PHASE_PENDING: &str = "Pending";
pub const POD_READY_CONDITION: &str = "Ready";
pub const POD_SCHEDULED_CONDITION: &str = "PodScheduled";
pub const POD_COMPLETED_REASON: &str = "PodCompleted";
pub const UNSCHEDULABLE_REASON: &str = "Unschedulable";
pub const CONDITION_TRUE: &str = "True";

// Env vars
pub const DEFAULT_API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";

// Defaults
pub const DEFAULT_BACKEND_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_LOG_TAIL_LINES: i64 = 100;
pub const DEFAULT_MAX_ACTION_ROUNDS: usize = 8;
pub const DEFAULT_DISPLAY_TRUNCATE_CHARS: usize = 4000;

// Timing
pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;

// Operator commands
pub const EXIT_COMMANDS: [&str; 2] = ["exit", "quit"];
pub const SWITCH_COMMAND: &str = "switch";
