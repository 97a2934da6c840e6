use crate::config::{DepthSortKey, PipelineConfig};
use crate::dataset::{Dataset, PositionedSpeaker};
use crate::{PipelineError, PipelineResult};
use colloquy_core::{
    ConversationIndex, CorpusLoader, GraphBuilder, SpeakerGraph, SpeakerRegistry, UtteranceSet,
    display_label,
};
use futures::io::AsyncBufRead;
use nautilus::{Algorithm, DepthSort, Edge, Graph, Node};
use rustc_hash::FxHashMap;

/// Single-pass corpus → graph → layout pipeline.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    depth_sort: Option<DepthSort>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> PipelineResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            depth_sort: None,
        })
    }

    /// Overrides the configured `depthSort` with an arbitrary comparator.
    pub fn with_depth_sort(mut self, sort: DepthSort) -> Self {
        self.depth_sort = Some(sort);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs the whole pipeline, reading the utterance stream from `reader`.
    ///
    /// `index` is optional; when given, filter ids it does not know are logged.
    pub async fn run<R>(
        &self,
        registry: &SpeakerRegistry,
        index: Option<&ConversationIndex>,
        reader: R,
    ) -> PipelineResult<Dataset>
    where
        R: AsyncBufRead + Unpin,
    {
        let utterances = self.loader(index).load(reader).await?;
        self.finish(registry, &utterances)
    }

    /// Synchronous variant of [`Pipeline::run`] for streams already in memory.
    pub fn run_sync(
        &self,
        registry: &SpeakerRegistry,
        index: Option<&ConversationIndex>,
        text: &str,
    ) -> PipelineResult<Dataset> {
        let utterances = self.loader(index).load_sync(text)?;
        self.finish(registry, &utterances)
    }

    /// Lays out an already built graph.
    pub fn layout_graph(&self, graph: SpeakerGraph) -> PipelineResult<Dataset> {
        let diameter = 2.0 * self.config.node_radius;
        let input = Graph {
            nodes: graph
                .nodes
                .iter()
                .map(|n| Node::new(n.id.clone(), diameter, diameter))
                .collect(),
            edges: graph
                .edges
                .iter()
                .map(|e| Edge::new(e.id.clone(), e.source.clone(), e.target.clone()))
                .collect(),
        };

        let mut opts = self.config.layout.to_options();
        opts.depth_sort = self
            .depth_sort
            .clone()
            .or_else(|| self.config.layout.depth_sort.map(|key| depth_sort(key, &graph)));
        let result = nautilus::layout(&input, Algorithm::Breadthfirst(opts))?;

        let mut nodes: Vec<PositionedSpeaker> = Vec::with_capacity(graph.nodes.len());
        for speaker in graph.nodes {
            let (Some(p), Some(depth)) = (result.position(&speaker.id), result.depth(&speaker.id))
            else {
                return Err(PipelineError::MissingPosition {
                    node_id: speaker.id,
                });
            };
            nodes.push(PositionedSpeaker {
                label: display_label(&speaker),
                x: p.x,
                y: p.y,
                depth,
                point: speaker.id.clone(),
                radius: self.config.node_radius,
                speaker,
            });
        }

        Ok(Dataset {
            nodes,
            edges: graph.edges,
            diagnostics: graph.diagnostics,
        })
    }

    fn loader(&self, index: Option<&ConversationIndex>) -> CorpusLoader {
        let filter = self.config.filter_set();
        if filter.is_empty() {
            tracing::warn!("no conversations selected; the dataset will be empty");
        }
        if let Some(index) = index {
            for id in index.unknown_ids(&filter) {
                tracing::warn!(conversation = %id, "filter id is not in the conversation index");
            }
        }
        CorpusLoader::new(filter)
    }

    fn finish(
        &self,
        registry: &SpeakerRegistry,
        utterances: &UtteranceSet,
    ) -> PipelineResult<Dataset> {
        let graph = GraphBuilder::new(registry).build(utterances)?;
        let dangling = graph.dangling_references().count();
        let dataset = self.layout_graph(graph)?;
        tracing::info!(
            utterances = utterances.len(),
            nodes = dataset.nodes.len(),
            edges = dataset.edges.len(),
            dangling,
            "speaker graph laid out"
        );
        Ok(dataset)
    }
}

fn depth_sort(key: DepthSortKey, graph: &SpeakerGraph) -> DepthSort {
    match key {
        // Rings already follow node order, which is insertion order.
        DepthSortKey::Insertion => DepthSort::new(|_, _| std::cmp::Ordering::Equal),
        DepthSortKey::Id => DepthSort::by_id(),
        DepthSortKey::Degree => {
            let degrees: FxHashMap<String, usize> = graph
                .degrees()
                .into_iter()
                .map(|(id, d)| (id.to_string(), d))
                .collect();
            DepthSort::new(move |a, b| {
                let da = degrees.get(&a.id).copied().unwrap_or(0);
                let db = degrees.get(&b.id).copied().unwrap_or(0);
                db.cmp(&da)
            })
        }
    }
}
