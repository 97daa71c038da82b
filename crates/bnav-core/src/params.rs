//! Agent capabilities and navigation tuning parameters.

// ── AgentParams ───────────────────────────────────────────────────────────────

/// Per-agent physical size and door capabilities, supplied with every path
/// query (agents differ; the graph does not store them).
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentParams {
    /// Horizontal collision radius of the agent's capsule.
    pub radius: f32,
    /// Whether the agent may pass through closed (but unlocked) doors.
    pub can_open_doors: bool,
    /// Whether the agent holds the key for locked doors.
    pub has_key: bool,
}

impl Default for AgentParams {
    fn default() -> Self {
        Self {
            radius: 0.35,
            can_open_doors: true,
            has_key: false,
        }
    }
}

// ── NavParams ─────────────────────────────────────────────────────────────────

/// Library-wide tuning knobs, shared by all agents.  The defaults match the
/// retry bounds the local reconstruction algorithm was designed around; they
/// are exposed so tests can tighten them.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavParams {
    /// Straight run-up distance placed in front of stairs/ramp entrances so
    /// agents line up with the connector before stepping onto it.
    pub stairs_extend: f32,
    /// Extra shrink applied to a hallway's narrow axis when computing the
    /// walkable area (keeps agents off the walls in tight corridors).
    pub hallway_margin: f32,
    /// Candidate destination points tried in the goal room before giving up.
    pub dest_retries: u32,
    /// Random single via-point samples per blocked segment.
    pub single_via_tries: u32,
    /// Random two-via-point attempts after the single search fails.
    pub double_via_tries: u32,
    /// Additive cost penalty for taking a vertical connector against the
    /// caller's preferred direction.  Biases route choice without forbidding.
    pub against_dir_penalty: f32,
}

impl Default for NavParams {
    fn default() -> Self {
        Self {
            stairs_extend: 0.6,
            hallway_margin: 0.25,
            dest_retries: 10,
            single_via_tries: 200,
            double_via_tries: 100,
            against_dir_penalty: 10.0,
        }
    }
}
