use anyhow::{Context, Result, bail};
use tracing::{info, info_span};

use dash_engine::{
    AggregateOptions, ClassifyOptions, Evaluator, aggregate, render_widgets, sort_by_key,
};
use dash_model::{CellValue, FieldName, MeasureOp, SheetId, parse_selection_arg};

use crate::summary::{
    print_aggregate, print_classifications, print_fields, print_rendered, print_selection,
    print_sheets,
};
use dash_cli::cli::{AggregateArgs, ClassifyArgs, DataArgs, RenderArgs, SelectCommand, SheetCommand};
use dash_cli::session::Session;

pub fn run_fields(data: &DataArgs) -> Result<()> {
    let session = Session::open(data)?;
    print_fields(&session.dataset);
    Ok(())
}

pub fn run_classify(data: &DataArgs, args: &ClassifyArgs) -> Result<()> {
    let mut session = Session::open(data)?;
    let snapshot = session.apply_selects(&args.selection.select)?;
    let fields: Vec<FieldName> = if args.fields.is_empty() {
        session.dataset.fields().iter().map(|f| f.name.clone()).collect()
    } else {
        args.fields.iter().map(|f| FieldName::from(f.as_str())).collect()
    };

    let span = info_span!("classify", fields = fields.len());
    let _guard = span.enter();
    let evaluator = Evaluator::new(&session.dataset, snapshot).with_options(ClassifyOptions {
        alternatives: args.alternatives,
    });
    let panes = evaluator.classify_fields(fields);

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&panes).context("encode classification")?
        );
    } else {
        print_classifications(&panes);
    }
    Ok(())
}

pub fn run_aggregate(data: &DataArgs, args: &AggregateArgs) -> Result<()> {
    let mut session = Session::open(data)?;
    let snapshot = session.apply_selects(&args.selection.select)?;
    let evaluator = Evaluator::new(&session.dataset, snapshot);
    let rows = evaluator.possible_rows();
    info!(
        rows = rows.len(),
        dimension = %args.dimension,
        "aggregating possible rows"
    );

    let options = AggregateOptions {
        top_n: if args.all { None } else { Some(args.top) },
    };
    let op = MeasureOp::from(args.op);
    let mut entries = aggregate(
        &rows,
        &args.dimension,
        args.measure.as_deref(),
        Some(op),
        &options,
    );
    if args.by_key {
        sort_by_key(&mut entries);
    }

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&entries).context("encode aggregation")?
        );
    } else {
        let label = match &args.measure {
            Some(measure) => format!("{}({measure})", op.as_str()),
            None => "-".to_string(),
        };
        print_aggregate(&args.dimension, &label, &entries);
    }
    Ok(())
}

pub fn run_select(data: &DataArgs, command: &SelectCommand) -> Result<()> {
    let mut session = Session::open(data)?;
    if !session.has_store() {
        bail!("selection commands need a session store; pass --store <PATH>");
    }
    match command {
        SelectCommand::Toggle { selection } => {
            let (field, value) = parse_selection_arg(selection, |name, value| {
                session.dataset.resolve_value(name, value)
            })?;
            session.selection.toggle(field, value);
            session.save_selection()?;
        }
        SelectCommand::Only { field, values } => {
            let values: Vec<CellValue> = values
                .iter()
                .map(|raw| session.dataset.resolve_value(field, raw))
                .collect();
            session.selection.select_only(field.as_str(), values);
            session.save_selection()?;
        }
        SelectCommand::Clear { field } => {
            session.selection.clear_field(field);
            session.save_selection()?;
        }
        SelectCommand::ClearAll => {
            session.selection.clear_all();
            session.save_selection()?;
        }
        SelectCommand::Show => {}
    }
    print_selection(&session.selection.summary(&session.dataset));
    Ok(())
}

pub fn run_sheet(data: &DataArgs, command: &SheetCommand) -> Result<()> {
    let mut session = Session::open(data)?;
    if !session.has_store() {
        bail!("sheet commands need a session store; pass --store <PATH>");
    }
    let mut dashboard = session.dashboard()?;
    let changed = match command {
        SheetCommand::List => false,
        SheetCommand::Add => {
            let id = dashboard.add_sheet();
            info!(sheet = %id, "added sheet");
            true
        }
        SheetCommand::Remove { id } => {
            let id = SheetId::from(id.as_str());
            if dashboard.sheet(&id).is_none() {
                bail!("no sheet with id '{id}'");
            }
            if !dashboard.remove_sheet(&id) {
                bail!("cannot remove '{id}': a dashboard keeps at least one sheet");
            }
            true
        }
        SheetCommand::Rename { id, name } => {
            require(dashboard.rename_sheet(&SheetId::from(id.as_str()), name.as_str()), id)?;
            true
        }
        SheetCommand::Title { id, title } => {
            require(
                dashboard.set_sheet_title(&SheetId::from(id.as_str()), title.as_str()),
                id,
            )?;
            true
        }
        SheetCommand::Activate { id } => {
            require(dashboard.set_active(&SheetId::from(id.as_str())), id)?;
            true
        }
        SheetCommand::Retitle { title } => {
            dashboard.title = title.clone();
            true
        }
    };
    if changed {
        session.save_dashboard(&dashboard)?;
    }
    print_sheets(&dashboard);
    Ok(())
}

pub fn run_render(data: &DataArgs, args: &RenderArgs) -> Result<()> {
    let mut session = Session::open(data)?;
    let snapshot = session.apply_selects(&args.selection.select)?;
    let dashboard = session.dashboard()?;
    let sheet = match &args.sheet {
        Some(id) => dashboard
            .sheet(&SheetId::from(id.as_str()))
            .with_context(|| format!("no sheet with id '{id}'"))?,
        None => dashboard.active().context("dashboard has no sheets")?,
    };

    let span = info_span!("render", sheet = %sheet.id, widgets = sheet.widgets.len());
    let _guard = span.enter();
    let evaluator = Evaluator::new(&session.dataset, snapshot);
    let options = AggregateOptions {
        top_n: Some(args.top),
    };
    let rendered = render_widgets(&sheet.widgets, &evaluator, &options);

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&rendered).context("encode widgets")?
        );
    } else {
        print_rendered(sheet.display_title(), &rendered);
    }
    Ok(())
}

fn require(found: bool, id: &str) -> Result<()> {
    if found {
        Ok(())
    } else {
        bail!("no sheet with id '{id}'")
    }
}
