use core::fmt;
use fxhash::FxBuildHasher;
use grid_util::point::Point;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::Rc;
use std::task::Poll;

use crate::heap::BinaryHeap;
use crate::node::{NodeList, SearchNode};

pub(crate) type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

/// Outcome of a search: the path from start to end, or [None] if the end cannot be reached.
pub type PathResult = Option<Vec<Point>>;

/// Identifies a pending search. Ids are handed out per [Pathfinder](crate::Pathfinder),
/// start at 1 and are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub(crate) u64);

impl InstanceId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Entry of the open set: the arena index of a node and its priority at the time it was
/// pushed or last updated. Entries are identified by index alone.
#[derive(Clone, Copy, Debug)]
pub(crate) struct OpenEntry {
    pub index: usize,
    pub estimate: f64,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

pub(crate) type OpenList = BinaryHeap<OpenEntry, fn(&OpenEntry, &OpenEntry) -> Ordering>;

fn by_estimate(a: &OpenEntry, b: &OpenEntry) -> Ordering {
    a.estimate.total_cmp(&b.estimate)
}

enum Slot {
    Pending,
    Ready(PathResult),
    Taken,
}

/// A promise-like view on the result of a search requested with
/// [find_path_handle](crate::Pathfinder::find_path_handle). The result becomes available
/// once [calculate](crate::Pathfinder::calculate) resolves the search.
#[derive(Clone)]
pub struct PathHandle {
    id: Option<InstanceId>,
    slot: Rc<RefCell<Slot>>,
}

impl PathHandle {
    pub(crate) fn new() -> PathHandle {
        PathHandle {
            id: None,
            slot: Rc::new(RefCell::new(Slot::Pending)),
        }
    }

    pub(crate) fn with_id(mut self, id: Option<InstanceId>) -> PathHandle {
        self.id = id;
        self
    }

    /// The id of the underlying search, [None] if the request was resolved without searching.
    pub fn id(&self) -> Option<InstanceId> {
        self.id
    }

    /// True once a result has been delivered and not yet taken.
    pub fn is_ready(&self) -> bool {
        matches!(*self.slot.borrow(), Slot::Ready(_))
    }

    /// Takes the result if it has been delivered. The result is handed out only once, later
    /// polls (and polls of a cancelled search) stay [Poll::Pending].
    pub fn poll(&self) -> Poll<PathResult> {
        let mut slot = self.slot.borrow_mut();
        match std::mem::replace(&mut *slot, Slot::Taken) {
            Slot::Ready(result) => Poll::Ready(result),
            other => {
                *slot = other;
                Poll::Pending
            }
        }
    }
}

/// Where the result of a search goes once it is known.
pub(crate) enum ResultSink {
    Callback(Box<dyn FnOnce(PathResult)>),
    Handle(PathHandle),
}

impl ResultSink {
    pub fn deliver(self, result: PathResult) {
        match self {
            ResultSink::Callback(callback) => callback(result),
            ResultSink::Handle(handle) => {
                *handle.slot.borrow_mut() = Slot::Ready(result);
            }
        }
    }
}

/// Counts describing how far a pending search has progressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchProgress {
    pub discovered: usize,
    pub open: usize,
    pub closed: usize,
}

/// The state of one path request: its goal, every node it has discovered and its open set.
pub(crate) struct SearchInstance {
    pub start: Point,
    pub end: Point,
    pub nodes: FxIndexMap<Point, SearchNode>,
    pub open: OpenList,
    pub sink: ResultSink,
}

impl SearchInstance {
    pub fn new(start: Point, end: Point, sink: ResultSink) -> SearchInstance {
        SearchInstance {
            start,
            end,
            nodes: FxIndexMap::default(),
            open: BinaryHeap::new(by_estimate as fn(&OpenEntry, &OpenEntry) -> Ordering),
            sink,
        }
    }

    /// Adds a node to the arena if its point is new and returns its index, together with a
    /// flag telling whether it was inserted.
    pub fn insert_node(&mut self, node: SearchNode) -> (usize, bool) {
        match self.nodes.get_index_of(&node.point) {
            Some(index) => (index, false),
            None => {
                let (index, _) = self.nodes.insert_full(node.point, node);
                (index, true)
            }
        }
    }

    pub fn node(&self, index: usize) -> Option<&SearchNode> {
        self.nodes.get_index(index).map(|(_, node)| node)
    }

    pub fn node_mut(&mut self, index: usize) -> Option<&mut SearchNode> {
        self.nodes.get_index_mut(index).map(|(_, node)| node)
    }

    /// Marks the node as open and pushes it onto the open set.
    pub fn open_node(&mut self, index: usize) {
        if let Some(node) = self.node_mut(index) {
            node.list = NodeList::Open;
            let estimate = node.best_guess_distance();
            self.open.push(OpenEntry { index, estimate });
        }
    }

    /// Follows the parent links from `index` back to the start and returns the path in
    /// start to end order.
    pub fn reconstruct_path(&self, index: usize) -> Vec<Point> {
        let mut path: Vec<Point> = std::iter::successors(self.node(index), |node| {
            node.parent.and_then(|parent| self.node(parent))
        })
        .map(|node| node.point)
        .collect();
        path.reverse();
        path
    }

    pub fn progress(&self) -> SearchProgress {
        let closed = self
            .nodes
            .values()
            .filter(|node| node.list == NodeList::Closed)
            .count();
        SearchProgress {
            discovered: self.nodes.len(),
            open: self.open.len(),
            closed,
        }
    }
}
