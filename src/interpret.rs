//! Ordered threshold tables that turn summary metrics into sentences
//!
//! Each table is checked top to bottom; the first rule whose lower bound the
//! value exceeds wins, otherwise the fallback applies.

/// One row of a threshold table: applies when `value > above`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rule {
    pub above: f64,
    pub text: &'static str,
}

/// Ordered rules with a fallback sentence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleTable {
    pub rules: &'static [Rule],
    pub fallback: &'static str,
}

impl RuleTable {
    pub fn interpret(&self, value: f64) -> &'static str {
        self.rules
            .iter()
            .find(|r| value > r.above)
            .map_or(self.fallback, |r| r.text)
    }
}

pub const CONNECTION_DENSITY: RuleTable = RuleTable {
    rules: &[
        Rule {
            above: 0.3,
            text: "Densely connected data model",
        },
        Rule {
            above: 0.1,
            text: "Moderately connected data model",
        },
    ],
    fallback: "Sparsely connected data model",
};

pub const FORMULA_DEPENDENCIES: RuleTable = RuleTable {
    rules: &[
        Rule {
            above: 30.0,
            text: "High formula dependencies",
        },
        Rule {
            above: 10.0,
            text: "Moderate formula dependencies",
        },
    ],
    fallback: "Low formula dependencies",
};

/// Keyed on the maximum scene depth
pub const NAVIGATION_DEPTH: RuleTable = RuleTable {
    rules: &[
        Rule {
            above: 4.0,
            text: "High complexity",
        },
        Rule {
            above: 2.0,
            text: "Moderate complexity",
        },
    ],
    fallback: "Simple hierarchy",
};

/// Keyed on the longest chain of views linked through parent sources
pub const VIEW_CHAIN_DEPTH: RuleTable = RuleTable {
    rules: &[
        Rule {
            above: 3.0,
            text: "Deep record drill-downs",
        },
        Rule {
            above: 1.0,
            text: "Some parent-child drill-downs",
        },
    ],
    fallback: "Flat record views",
};

/// Keyed on the share of scenes that require login
pub const AUTHENTICATION_COVERAGE: RuleTable = RuleTable {
    rules: &[
        Rule {
            above: 0.8,
            text: "Mostly authenticated application",
        },
        Rule {
            above: 0.2,
            text: "Mix of public and authenticated pages",
        },
    ],
    fallback: "Mostly public application",
};

/// Keyed on the number of distinct view types
pub const VIEW_DIVERSITY: RuleTable = RuleTable {
    rules: &[
        Rule {
            above: 6.0,
            text: "Diverse UI with many view types",
        },
        Rule {
            above: 3.0,
            text: "Moderately varied UI",
        },
    ],
    fallback: "Uniform UI built from few view types",
};

/// Keyed on the number of role-restricted scenes
pub const ROLE_USAGE: RuleTable = RuleTable {
    rules: &[Rule {
        above: 0.0,
        text: "Role-based access control in use",
    }],
    fallback: "No role restrictions detected",
};

pub const MODULARITY: RuleTable = RuleTable {
    rules: &[
        Rule {
            above: 0.7,
            text: "Highly modular - easy to extend",
        },
        Rule {
            above: 0.4,
            text: "Moderately modular - some refactoring may help",
        },
    ],
    fallback: "Low modularity - changes may have wide impact",
};

/// Keyed on internal / (internal + external) connections of a cluster
pub const CLUSTER_COHESION: RuleTable = RuleTable {
    rules: &[
        Rule {
            above: 0.7,
            text: "high",
        },
        Rule {
            above: 0.4,
            text: "medium",
        },
    ],
    fallback: "low",
};

/// One row of a two-count table: applies when `matches(a, b)` holds
#[derive(Debug, Clone, Copy)]
pub struct CountRule {
    pub matches: fn(usize, usize) -> bool,
    pub text: &'static str,
}

/// Ordered rules over a pair of counts with a fallback sentence
#[derive(Debug, Clone, Copy)]
pub struct CountTable {
    pub rules: &'static [CountRule],
    pub fallback: &'static str,
}

impl CountTable {
    pub fn interpret(&self, a: usize, b: usize) -> &'static str {
        self.rules
            .iter()
            .find(|r| (r.matches)(a, b))
            .map_or(self.fallback, |r| r.text)
    }
}

/// Keyed on (bottlenecks, high fan-out objects)
pub const TECHNICAL_DEBT: CountTable = CountTable {
    rules: &[
        CountRule {
            matches: |bottlenecks, _| bottlenecks > 2,
            text: "High refactoring risk - multiple bottleneck objects",
        },
        CountRule {
            matches: |bottlenecks, fan_out| bottlenecks + fan_out > 0,
            text: "Some complexity hotspots",
        },
    ],
    fallback: "Low technical debt",
};

/// Keyed on (inbound, outbound) connections of a hub object
pub const HUB_ROLE: CountTable = CountTable {
    rules: &[
        CountRule {
            matches: |inbound, outbound| inbound + outbound == 0,
            text: "Isolated",
        },
        CountRule {
            matches: |inbound, outbound| inbound > 2 * outbound,
            text: "Central dependency - many objects depend on this",
        },
        CountRule {
            matches: |inbound, outbound| outbound > 2 * inbound,
            text: "Aggregator - depends on many objects",
        },
        CountRule {
            matches: |inbound, outbound| inbound + outbound >= 5,
            text: "Core hub - high bidirectional connectivity",
        },
    ],
    fallback: "Moderately connected",
};
