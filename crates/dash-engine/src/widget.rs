//! Turn stored widget definitions into the data each widget displays.

use dash_model::{FieldName, Widget, WidgetKind};
use serde::Serialize;
use tracing::{debug, debug_span};

use crate::aggregate::{AggregateEntry, AggregateOptions, Kpi, aggregate, kpi, sort_by_key};
use crate::evaluator::{ClassifiedValue, Evaluator};

/// Data behind one widget, independent of how it is drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WidgetData {
    Filter {
        field: FieldName,
        values: Vec<ClassifiedValue>,
    },
    Series {
        entries: Vec<AggregateEntry>,
    },
    Table {
        dimension: FieldName,
        measure: Option<FieldName>,
        entries: Vec<AggregateEntry>,
    },
    Kpi(Kpi),
    Text {
        text: String,
    },
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedWidget {
    pub id: String,
    pub title: String,
    pub kind: WidgetKind,
    pub data: WidgetData,
}

/// Compute the data for `widget` under the evaluator's selection.
///
/// Charts and KPIs aggregate the rows compatible with every active
/// selection. A chart without a measure has nothing to plot; a table without
/// one lists the distinct values of its dimension.
pub fn widget_data(
    widget: &Widget,
    evaluator: &Evaluator<'_>,
    options: &AggregateOptions,
) -> WidgetData {
    if widget.kind == WidgetKind::Text {
        let text = widget
            .config
            .as_ref()
            .and_then(|config| config.text.clone())
            .or_else(|| widget.content.clone())
            .unwrap_or_default();
        return WidgetData::Text { text };
    }

    let Some(config) = widget.config.as_ref() else {
        return WidgetData::Empty;
    };
    let dimension = config.dimension.as_str();
    let measure = config.measure.as_ref().map(FieldName::as_str);

    match widget.kind {
        WidgetKind::Filter => WidgetData::Filter {
            field: config.dimension.clone(),
            values: evaluator.classify(dimension).values,
        },
        WidgetKind::Bar | WidgetKind::Pie | WidgetKind::Line => {
            if measure.is_none() {
                return WidgetData::Series {
                    entries: Vec::new(),
                };
            }
            let rows = evaluator.possible_rows();
            let mut entries = aggregate(&rows, dimension, measure, config.measure_op, options);
            if widget.kind == WidgetKind::Line {
                sort_by_key(&mut entries);
            }
            WidgetData::Series { entries }
        }
        WidgetKind::Table => {
            let rows = evaluator.possible_rows();
            WidgetData::Table {
                dimension: config.dimension.clone(),
                measure: config.measure.clone(),
                entries: aggregate(&rows, dimension, measure, config.measure_op, options),
            }
        }
        WidgetKind::Kpi => match measure {
            Some(measure) => {
                let rows = evaluator.possible_rows();
                WidgetData::Kpi(kpi(&rows, measure, config.measure_op))
            }
            None => WidgetData::Empty,
        },
        WidgetKind::Text => WidgetData::Empty,
    }
}

/// Compute data for every widget of a sheet, in order.
pub fn render_widgets(
    widgets: &[Widget],
    evaluator: &Evaluator<'_>,
    options: &AggregateOptions,
) -> Vec<RenderedWidget> {
    let span = debug_span!("render_widgets", widgets = widgets.len());
    let _guard = span.enter();

    widgets
        .iter()
        .map(|widget| {
            let data = widget_data(widget, evaluator, options);
            debug!(id = %widget.id, kind = %widget.kind, "rendered widget");
            RenderedWidget {
                id: widget.id.clone(),
                title: widget.title.clone(),
                kind: widget.kind,
                data,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use dash_model::{
        CellValue, Dataset, MeasureOp, Row, SelectionSnapshot, ValueState, WidgetConfig,
    };

    use super::*;

    fn dataset() -> Dataset {
        Dataset::from_rows(vec![
            Row::new()
                .with("Region", "North")
                .with("Product", "A")
                .with("Sales", 100.0),
            Row::new()
                .with("Region", "South")
                .with("Product", "B")
                .with("Sales", 200.0),
            Row::new()
                .with("Region", "North")
                .with("Product", "B")
                .with("Sales", 150.0),
        ])
    }

    fn north() -> SelectionSnapshot {
        SelectionSnapshot::empty().toggled(&FieldName::from("Region"), &CellValue::text("North"))
    }

    #[test]
    fn bar_chart_aggregates_possible_rows() {
        let dataset = dataset();
        let evaluator = Evaluator::new(&dataset, north());
        let widget = Widget::new("w1", WidgetKind::Bar, "Sales by product")
            .with_config(WidgetConfig::dimension("Product").with_measure("Sales", MeasureOp::Sum));

        let WidgetData::Series { entries } =
            widget_data(&widget, &evaluator, &AggregateOptions::default())
        else {
            panic!("expected a series");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key, "B");
        assert_eq!(entries[0].value, Some(150.0));
    }

    #[test]
    fn line_chart_sorts_by_key() {
        let dataset = dataset();
        let evaluator = Evaluator::new(&dataset, SelectionSnapshot::empty());
        let widget = Widget::new("w1", WidgetKind::Line, "Trend")
            .with_config(WidgetConfig::dimension("Region").with_measure("Sales", MeasureOp::Sum));
        let WidgetData::Series { entries } =
            widget_data(&widget, &evaluator, &AggregateOptions::default())
        else {
            panic!("expected a series");
        };
        let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["North", "South"]);
    }

    #[test]
    fn chart_without_measure_is_empty_series() {
        let dataset = dataset();
        let evaluator = Evaluator::new(&dataset, SelectionSnapshot::empty());
        let widget =
            Widget::new("w1", WidgetKind::Pie, "Mix").with_config(WidgetConfig::dimension("Region"));
        assert_eq!(
            widget_data(&widget, &evaluator, &AggregateOptions::default()),
            WidgetData::Series {
                entries: Vec::new()
            }
        );
    }

    #[test]
    fn filter_widget_classifies_its_dimension() {
        let dataset = dataset();
        let evaluator = Evaluator::new(&dataset, north());
        let widget = Widget::new("f1", WidgetKind::Filter, "Product")
            .with_config(WidgetConfig::dimension("Product"));
        let WidgetData::Filter { values, .. } =
            widget_data(&widget, &evaluator, &AggregateOptions::default())
        else {
            panic!("expected a filter");
        };
        assert!(values.iter().all(|v| v.state == ValueState::Possible));
    }

    #[test]
    fn text_and_unconfigured_widgets() {
        let dataset = dataset();
        let evaluator = Evaluator::new(&dataset, SelectionSnapshot::empty());

        let mut note = Widget::new("t1", WidgetKind::Text, "Note");
        note.content = Some("Quarterly review".to_string());
        assert_eq!(
            widget_data(&note, &evaluator, &AggregateOptions::default()),
            WidgetData::Text {
                text: "Quarterly review".to_string()
            }
        );

        let kpi = Widget::new("k1", WidgetKind::Kpi, "Total");
        assert_eq!(
            widget_data(&kpi, &evaluator, &AggregateOptions::default()),
            WidgetData::Empty
        );
    }

    #[test]
    fn render_keeps_widget_order() {
        let dataset = dataset();
        let evaluator = Evaluator::new(&dataset, SelectionSnapshot::empty());
        let widgets = vec![
            Widget::new("k1", WidgetKind::Kpi, "Total sales")
                .with_config(WidgetConfig::dimension("Region").with_measure("Sales", MeasureOp::Sum)),
            Widget::new("t1", WidgetKind::Table, "Regions")
                .with_config(WidgetConfig::dimension("Region")),
        ];
        let rendered = render_widgets(&widgets, &evaluator, &AggregateOptions::default());
        assert_eq!(rendered[0].id, "k1");
        match &rendered[0].data {
            WidgetData::Kpi(kpi) => assert_eq!(kpi.value, 450.0),
            other => panic!("unexpected {other:?}"),
        }
        match &rendered[1].data {
            WidgetData::Table { entries, .. } => assert_eq!(entries.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
    }
}
