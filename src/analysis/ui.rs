//! Scene, view and access-control patterns

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use super::round_to;
use crate::interpret::{
    AUTHENTICATION_COVERAGE, NAVIGATION_DEPTH, ROLE_USAGE, VIEW_CHAIN_DEPTH, VIEW_DIVERSITY,
};
use crate::schema::{Application, Scene, ViewSource};

#[derive(Debug, Clone, Serialize)]
pub struct ScenePatterns {
    pub authenticated_scenes: usize,
    pub public_scenes: usize,
    pub total_scenes: usize,
    pub authenticated_views: usize,
    pub public_views: usize,
    pub interpretation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewTypeCount {
    pub view_type: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewPatterns {
    /// Most used view types first
    pub counts: Vec<ViewTypeCount>,
    pub distinct_types: usize,
    pub interpretation: String,
}

/// Drill-down depth over views: a view whose parent source is object A
/// continues the chain of any view sourced on A
#[derive(Debug, Clone, Serialize)]
pub struct ViewChainDepth {
    pub max_depth: usize,
    pub avg_depth: f64,
    pub interpretation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavigationDepth {
    /// Scene depth along parent-scene links
    pub max_depth: usize,
    pub avg_depth: f64,
    /// Views that list records reached through a parent record
    pub views_with_parent_source: usize,
    pub view_chain: ViewChainDepth,
    pub interpretation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UiArchitecture {
    pub scene_patterns: ScenePatterns,
    pub view_patterns: ViewPatterns,
    pub navigation_depth: NavigationDepth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthenticationModel {
    UserBased,
    Public,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleUsage {
    pub scenes_with_role_restrictions: usize,
    pub interpretation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessPatterns {
    pub authentication_model: AuthenticationModel,
    pub user_objects: Vec<String>,
    pub role_usage: RoleUsage,
}

fn scene_patterns(app: &Application) -> ScenePatterns {
    let (authenticated, public): (Vec<&Scene>, Vec<&Scene>) =
        app.scenes.iter().partition(|s| s.authenticated);
    let total = app.scenes.len();
    let coverage = if total > 0 {
        authenticated.len() as f64 / total as f64
    } else {
        0.0
    };

    ScenePatterns {
        authenticated_scenes: authenticated.len(),
        public_scenes: public.len(),
        total_scenes: total,
        authenticated_views: authenticated.iter().map(|s| s.views.len()).sum(),
        public_views: public.iter().map(|s| s.views.len()).sum(),
        interpretation: AUTHENTICATION_COVERAGE.interpret(coverage).to_string(),
    }
}

fn view_patterns(app: &Application) -> ViewPatterns {
    let mut histogram: BTreeMap<&str, usize> = BTreeMap::new();
    for (_, view) in app.views() {
        *histogram.entry(view.view_type.as_str()).or_insert(0) += 1;
    }

    let mut counts: Vec<ViewTypeCount> = histogram
        .into_iter()
        .map(|(view_type, count)| ViewTypeCount {
            view_type: view_type.to_string(),
            count,
        })
        .collect();
    // BTreeMap order breaks ties by name
    counts.sort_by(|a, b| b.count.cmp(&a.count));

    let distinct = counts.len();
    ViewPatterns {
        counts,
        distinct_types: distinct,
        interpretation: VIEW_DIVERSITY.interpret(distinct as f64).to_string(),
    }
}

/// Depth of a scene counting itself; parents match by key or slug
fn scene_depth(app: &Application, scene: &Scene) -> usize {
    let mut depth = 1;
    let mut seen: HashSet<&str> = HashSet::from([scene.key.as_str()]);
    let mut current = scene;

    while let Some(parent) = current.parent.as_deref().filter(|p| !p.is_empty()) {
        let Some(next) = app
            .scenes
            .iter()
            .find(|s| s.key == parent || (!s.slug.is_empty() && s.slug == parent))
        else {
            break;
        };
        if !seen.insert(next.key.as_str()) {
            break;
        }
        depth += 1;
        current = next;
    }
    depth
}

/// Parent-source objects of the views, grouped by each view's source object
struct ViewChains<'a> {
    by_source: HashMap<&'a str, Vec<Option<&'a str>>>,
}

impl<'a> ViewChains<'a> {
    fn new(app: &'a Application) -> Self {
        let mut by_source: HashMap<&str, Vec<Option<&str>>> = HashMap::new();
        for source in app.views().filter_map(|(_, v)| v.source.as_ref()) {
            let parent = source.parent_source.as_ref().map(|p| p.object.as_str());
            by_source
                .entry(source.object.as_str())
                .or_default()
                .push(parent);
        }
        Self { by_source }
    }

    /// Longest view chain ending in a view sourced on `object`
    fn reach(&self, object: &'a str, path: &mut HashSet<&'a str>) -> usize {
        let Some(parents) = self.by_source.get(object) else {
            return 0;
        };
        if !path.insert(object) {
            return 0;
        }
        let mut best = 0;
        for parent in parents {
            let above = parent.map_or(0, |p| self.reach(p, path));
            best = best.max(1 + above);
        }
        path.remove(object);
        best
    }

    /// Depth of one view counting itself
    fn depth(&self, source: &'a ViewSource) -> usize {
        let mut path = HashSet::from([source.object.as_str()]);
        1 + source
            .parent_source
            .as_ref()
            .map_or(0, |p| self.reach(p.object.as_str(), &mut path))
    }
}

fn view_chain_depth(app: &Application) -> ViewChainDepth {
    let chains = ViewChains::new(app);
    let depths: Vec<usize> = app
        .views()
        .filter_map(|(_, v)| v.source.as_ref())
        .map(|source| chains.depth(source))
        .collect();
    let max_depth = depths.iter().copied().max().unwrap_or(0);
    let avg_depth = if depths.is_empty() {
        0.0
    } else {
        round_to(depths.iter().sum::<usize>() as f64 / depths.len() as f64, 1)
    };

    ViewChainDepth {
        max_depth,
        avg_depth,
        interpretation: VIEW_CHAIN_DEPTH.interpret(max_depth as f64).to_string(),
    }
}

fn navigation_depth(app: &Application) -> NavigationDepth {
    let depths: Vec<usize> = app.scenes.iter().map(|s| scene_depth(app, s)).collect();
    let max_depth = depths.iter().copied().max().unwrap_or(0);
    let avg_depth = if depths.is_empty() {
        0.0
    } else {
        round_to(depths.iter().sum::<usize>() as f64 / depths.len() as f64, 1)
    };

    NavigationDepth {
        max_depth,
        avg_depth,
        views_with_parent_source: app
            .views()
            .filter(|(_, v)| {
                v.source
                    .as_ref()
                    .is_some_and(|s| s.parent_source.is_some())
            })
            .count(),
        view_chain: view_chain_depth(app),
        interpretation: NAVIGATION_DEPTH.interpret(max_depth as f64).to_string(),
    }
}

pub(super) fn analyze(app: &Application) -> UiArchitecture {
    UiArchitecture {
        scene_patterns: scene_patterns(app),
        view_patterns: view_patterns(app),
        navigation_depth: navigation_depth(app),
    }
}

pub(super) fn access_patterns(app: &Application) -> AccessPatterns {
    let user_objects: Vec<String> = app
        .objects
        .iter()
        .filter(|o| o.is_user_profile())
        .map(|o| o.name.clone())
        .collect();
    let restricted = app.scenes.iter().filter(|s| s.is_role_restricted()).count();

    AccessPatterns {
        authentication_model: if user_objects.is_empty() {
            AuthenticationModel::Public
        } else {
            AuthenticationModel::UserBased
        },
        user_objects,
        role_usage: RoleUsage {
            scenes_with_role_restrictions: restricted,
            interpretation: ROLE_USAGE.interpret(restricted as f64).to_string(),
        },
    }
}
