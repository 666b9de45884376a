//! Relationship topology: connection graph, hubs, clusters, coupling

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::round_to;
use crate::interpret::{CLUSTER_COHESION, HUB_ROLE, MODULARITY};
use crate::schema::{Application, Object};

/// Minimum total connections for a hub object
const HUB_MIN_CONNECTIONS: usize = 3;
const MAX_HUBS: usize = 10;

/// Objects this connected push the style toward hub-and-spoke
const STYLE_HUB_CONNECTIONS: usize = 5;

/// Shared outbound targets that make two connected objects tightly coupled
const SHARED_TARGETS_FOR_COUPLING: usize = 3;
/// Connections between two objects (both directions) for tight coupling
const MUTUAL_CONNECTIONS_FOR_COUPLING: usize = 2;
const MAX_COUPLED_PAIRS: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct GraphEdge {
    pub from: String,
    pub from_name: String,
    pub to: String,
    pub to_name: String,
    pub via: String,
    pub connection_name: String,
    /// Cardinality pair, e.g. `one_to_many`
    #[serde(rename = "type")]
    pub edge_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectionGraph {
    pub nodes: Vec<String>,
    pub edges: Vec<GraphEdge>,
    pub total_connections: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct HubObject {
    pub object: String,
    pub object_key: String,
    pub inbound_connections: usize,
    pub outbound_connections: usize,
    pub total_connections: usize,
    pub interpretation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DependencyCluster {
    pub objects: Vec<String>,
    pub object_keys: Vec<String>,
    pub internal_connections: usize,
    pub external_connections: usize,
    pub cohesion: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RelationshipMap {
    pub connection_graph: ConnectionGraph,
    pub hub_objects: Vec<HubObject>,
    pub dependency_clusters: Vec<DependencyCluster>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CouplingReason {
    /// Connected in both directions with several connections
    Bidirectional,
    /// Connected and pointing at many of the same objects
    SharedTargets,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoupledPair {
    pub object_a: String,
    pub object_a_key: String,
    pub object_b: String,
    pub object_b_key: String,
    pub connections_between: usize,
    pub shared_targets: usize,
    pub reason: CouplingReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchitecturalStyle {
    HubAndSpoke,
    Modular,
    Mixed,
}

#[derive(Debug, Clone, Serialize)]
pub struct Extensibility {
    pub modularity_score: f64,
    pub tight_coupling_pairs: Vec<CoupledPair>,
    pub architectural_style: ArchitecturalStyle,
    pub interpretation: String,
}

fn object_name<'a>(app: &'a Application, key: &str) -> &'a str {
    app.objects
        .iter()
        .find(|o| o.key == key)
        .map(|o| o.name.as_str())
        .unwrap_or("Unknown")
}

pub(super) fn relationship_map(app: &Application) -> RelationshipMap {
    let edges: Vec<GraphEdge> = app
        .objects
        .iter()
        .flat_map(|obj| {
            obj.outbound().iter().map(move |conn| GraphEdge {
                from: obj.key.clone(),
                from_name: obj.name.clone(),
                to: conn.object.clone(),
                to_name: object_name(app, &conn.object).to_string(),
                via: conn.key.clone(),
                connection_name: conn.name.clone(),
                edge_type: format!("{}_to_{}", conn.has, conn.belongs_to),
            })
        })
        .collect();

    let mut hubs: Vec<HubObject> = app
        .objects
        .iter()
        .filter(|obj| obj.connection_count() >= HUB_MIN_CONNECTIONS)
        .map(|obj| {
            let inbound = obj.inbound().len();
            let outbound = obj.outbound().len();
            HubObject {
                object: obj.name.clone(),
                object_key: obj.key.clone(),
                inbound_connections: inbound,
                outbound_connections: outbound,
                total_connections: inbound + outbound,
                interpretation: HUB_ROLE.interpret(inbound, outbound).to_string(),
            }
        })
        .collect();
    hubs.sort_by(|a, b| b.total_connections.cmp(&a.total_connections));
    hubs.truncate(MAX_HUBS);

    RelationshipMap {
        connection_graph: ConnectionGraph {
            nodes: app.objects.iter().map(|o| o.key.clone()).collect(),
            total_connections: edges.len(),
            edges,
        },
        hub_objects: hubs,
        dependency_clusters: identify_clusters(app),
    }
}

/// Neighbours of each object over inbound and outbound connections
fn adjacency(app: &Application) -> HashMap<&str, HashSet<&str>> {
    let mut adjacency: HashMap<&str, HashSet<&str>> = HashMap::new();
    for obj in &app.objects {
        let neighbours = adjacency.entry(obj.key.as_str()).or_default();
        for conn in obj.outbound().iter().chain(obj.inbound()) {
            neighbours.insert(conn.object.as_str());
        }
    }
    adjacency
}

/// Group objects that share two or more neighbours or connect directly.
///
/// Seeds are visited in declaration order; an object joins at most one
/// cluster and clusters need at least two members.
pub(super) fn identify_clusters(app: &Application) -> Vec<DependencyCluster> {
    let adjacency = adjacency(app);
    let empty = HashSet::new();
    let neighbours = |key: &str| adjacency.get(key).unwrap_or(&empty);

    let mut processed: HashSet<&str> = HashSet::new();
    let mut clusters = Vec::new();

    for obj in &app.objects {
        if processed.contains(obj.key.as_str()) {
            continue;
        }

        let seed_neighbours = neighbours(&obj.key);
        let mut members: Vec<&Object> = vec![obj];

        if seed_neighbours.len() >= 2 {
            for other in &app.objects {
                if other.key == obj.key || processed.contains(other.key.as_str()) {
                    continue;
                }
                if members.iter().any(|m| m.key == other.key) {
                    continue;
                }
                let shared = seed_neighbours
                    .intersection(neighbours(&other.key))
                    .count();
                if shared >= 2 || seed_neighbours.contains(other.key.as_str()) {
                    members.push(other);
                }
            }
        }

        if members.len() < 2 {
            continue;
        }

        let member_keys: HashSet<&str> = members.iter().map(|m| m.key.as_str()).collect();
        let mut internal = 0;
        let mut external = 0;
        for member in &members {
            for neighbour in neighbours(&member.key) {
                if member_keys.contains(neighbour) {
                    internal += 1;
                } else {
                    external += 1;
                }
            }
        }

        let total = internal + external;
        let cohesion = if total > 0 {
            CLUSTER_COHESION.interpret(internal as f64 / total as f64)
        } else {
            CLUSTER_COHESION.fallback
        };

        processed.extend(member_keys.iter().copied());
        clusters.push(DependencyCluster {
            objects: members.iter().map(|m| m.name.clone()).collect(),
            object_keys: members.iter().map(|m| m.key.clone()).collect(),
            // each internal edge is seen from both ends
            internal_connections: internal / 2,
            external_connections: external,
            cohesion: cohesion.to_string(),
        });
    }

    clusters
}

fn outbound_targets(obj: &Object) -> HashSet<&str> {
    obj.outbound().iter().map(|c| c.object.as_str()).collect()
}

/// Connected object pairs that are hard to change independently
pub(super) fn tight_coupling(app: &Application) -> Vec<CoupledPair> {
    let by_key: HashMap<&str, &Object> = app.objects.iter().map(|o| (o.key.as_str(), o)).collect();
    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let mut pairs = Vec::new();

    for obj in &app.objects {
        for conn in obj.outbound() {
            let Some(target) = by_key.get(conn.object.as_str()).copied() else {
                continue;
            };
            if target.key == obj.key {
                continue;
            }
            let pair_key = if obj.key <= target.key {
                (obj.key.as_str(), target.key.as_str())
            } else {
                (target.key.as_str(), obj.key.as_str())
            };
            if !seen.insert(pair_key) {
                continue;
            }

            let forward = obj.outbound().iter().filter(|c| c.object == target.key).count();
            let backward = target.outbound().iter().filter(|c| c.object == obj.key).count();
            let between = forward + backward;
            let shared = outbound_targets(obj)
                .intersection(&outbound_targets(target))
                .count();

            let reason = if backward > 0 && between >= MUTUAL_CONNECTIONS_FOR_COUPLING {
                CouplingReason::Bidirectional
            } else if shared >= SHARED_TARGETS_FOR_COUPLING {
                CouplingReason::SharedTargets
            } else {
                continue;
            };

            pairs.push(CoupledPair {
                object_a: obj.name.clone(),
                object_a_key: obj.key.clone(),
                object_b: target.name.clone(),
                object_b_key: target.key.clone(),
                connections_between: between,
                shared_targets: shared,
                reason,
            });
        }
    }

    pairs.sort_by(|a, b| {
        (b.connections_between + b.shared_targets).cmp(&(a.connections_between + a.shared_targets))
    });
    pairs.truncate(MAX_COUPLED_PAIRS);
    pairs
}

pub(super) fn extensibility(app: &Application, clusters: &[DependencyCluster]) -> Extensibility {
    let total_objects = app.objects.len();
    let clustered: usize = clusters.iter().map(|c| c.object_keys.len()).sum();
    let modularity = if total_objects > 0 {
        round_to(clustered as f64 / total_objects as f64, 2)
    } else {
        0.0
    };

    let hub_count = app
        .objects
        .iter()
        .filter(|o| o.connection_count() >= STYLE_HUB_CONNECTIONS)
        .count();
    let style = if hub_count > 0 && modularity < 0.5 {
        ArchitecturalStyle::HubAndSpoke
    } else if modularity > 0.6 {
        ArchitecturalStyle::Modular
    } else {
        ArchitecturalStyle::Mixed
    };

    Extensibility {
        modularity_score: modularity,
        tight_coupling_pairs: tight_coupling(app),
        architectural_style: style,
        interpretation: MODULARITY.interpret(modularity).to_string(),
    }
}
