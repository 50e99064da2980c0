use thiserror::Error;

/// `SimulationError` enumerates all possible errors returned by stepsim
#[derive(Error, Debug)]
pub enum SimulationError {
    /// Represents a tick step that is zero, negative or not finite
    #[error("The tick step must be a positive, finite duration")]
    NonPositiveTickStep,

    /// Represents a duration distribution with a zero or negative mean
    #[error("The duration distribution of `{entity}` must have a positive mean")]
    NonPositiveMean { entity: String },

    /// Represents a duration distribution with a negative or non-finite jitter
    #[error("The duration distribution of `{entity}` must have a finite, non-negative jitter")]
    NegativeJitter { entity: String },

    /// Represents a mean and jitter whose sampling range overflows
    #[error("The duration distribution of `{entity}` has an unbounded sampling range")]
    UnboundedRange { entity: String },

    /// Represents a declared kind without a route in a router
    #[error("Router `{router}` has no route for kind `{kind}`")]
    UnmappedKind { router: String, kind: String },

    /// Represents a route for a kind that the network never declares
    #[error("Router `{router}` routes the undeclared kind `{kind}`")]
    UnknownKind { router: String, kind: String },

    /// Represents a router in a network without any declared kinds
    #[error("Router `{router}` requires the network to declare at least one kind")]
    RouterWithoutKinds { router: String },

    /// Represents kind weights that do not line up with the declared kinds
    #[error("Source `{source_id}` must provide exactly one weight per declared kind")]
    KindWeightsMismatch { source_id: String },

    /// Represents a reference to a queue that does not exist
    #[error("Queue `{0}` cannot be found in the network")]
    QueueNotFound(String),

    /// Represents a reference to a pool that does not exist
    #[error("Pool `{0}` cannot be found in the network")]
    PoolNotFound(String),

    /// Represents an operation requested on an entity that does not exist
    #[error("Entity `{0}` cannot be found in the network")]
    EntityNotFound(String),

    /// Represents two queues, pools or entities sharing one ID
    #[error("The ID `{0}` is used more than once in the network")]
    DuplicateId(String),

    /// Represents a queue that no router or server ever drains
    #[error("Queue `{queue}` has no router or server consuming from it")]
    UnconsumedQueue { queue: String },

    /// Represents a pool without any members
    #[error("Pool `{pool}` has no router or server members")]
    EmptyPool { pool: String },

    /// Represents an epsilon that is negative, not finite, or not smaller
    /// than the tick step
    #[error("The epsilon must be a finite, non-negative value smaller than the tick step")]
    InvalidEpsilon,

    /// Represents a source or route that sends work straight out of the
    /// network, without any server processing it
    #[error("`{entity}` cannot target the network exit; only servers may")]
    ExitNotAllowed { entity: String },

    /// Represents a negative or non-finite SLA threshold
    #[error("The SLA threshold must be a finite, non-negative duration")]
    InvalidSlaThreshold,

    /// Represents a probability outside of [0, 1]
    #[error("The repeat probability of `{entity}` must lie within [0, 1]")]
    InvalidProbability { entity: String },

    /// Represents a repeating server that has no queue to repeat into
    #[error("Server `{entity}` repeats work, so it must consume from a queue")]
    RepeatWithoutQueue { entity: String },

    /// Represents a network without any sources
    #[error("The network must contain at least one source")]
    NoSources,

    /// Represents an output analysis over zero points
    #[error("An output sample must contain at least one point")]
    EmptySample,

    /// Represents a failed conversion to num-traits Float
    #[error("Failed to convert to a Float value")]
    FloatConvError,

    /// Represents an event scheduled before the last event taken from the
    /// event list
    #[error("An event cannot be scheduled in the past")]
    BackInTime,

    /// Represents an invalid entity state
    #[error("An invalid entity state was encountered")]
    InvalidModelState,

    /// Transparent serde_json errors
    #[error(transparent)]
    JSONError(#[from] serde_json::error::Error),

    /// Transparent serde_yaml errors
    #[error(transparent)]
    YAMLError(#[from] serde_yaml::Error),

    /// Transparent Exponential distribution errors
    #[error(transparent)]
    ExpError(#[from] rand_distr::ExpError),

    /// Transparent Normal distribution errors
    #[error(transparent)]
    NormalError(#[from] rand_distr::NormalError),

    /// Transparent Bernoulli distribution errors
    #[error(transparent)]
    BernoulliError(#[from] rand_distr::BernoulliError),

    /// Transparent Weighted Index distribution errors
    #[error(transparent)]
    WeightedError(#[from] rand_distr::WeightedError),
}
