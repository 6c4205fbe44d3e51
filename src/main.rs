use anyhow::{Context, Result};
use maltego_transform::transform::{signal, ENTITY_VALUE_KEY};
use maltego_transform::{Config, Entity, Field, ToXml, Transformation};

/// Build the response entity: the input value re-typed, with every other
/// input argument carried along as a field.
fn build_entity(transform: &Transformation, config: &Config) -> Result<Entity> {
    let settings = &config.transform;
    let entity_value = transform
        .entity_value()
        .context("Invocation carries no entity value")?;

    let mut entity = Entity::new(settings.entity_type.as_str(), entity_value).with_weight(settings.weight);

    let mut inputs: Vec<(&String, &String)> = transform
        .input_arguments()
        .iter()
        .filter(|(key, _)| key.as_str() != ENTITY_VALUE_KEY)
        .collect();
    inputs.sort();

    for (name, value) in inputs {
        let field = Field::new(name.as_str())
            .with_context(|| format!("Input argument {:?} cannot become a field", name))?
            .with_value(value.as_str())
            .with_matching_rule(settings.matching_rule);
        entity.add_field(field);
    }

    if let Some(label) = &settings.edge_label {
        entity.add_edge_label(label.as_str(), &[])?;
    }

    Ok(entity)
}

fn run(config: &Config) -> Result<()> {
    // Raw arguments: the host passes values that may start with '-'
    let args: Vec<String> = std::env::args().skip(1).collect();
    log::debug!("Invoked with {} arguments", args.len());

    let mut transform = Transformation::from_args(args)?;
    if config.transform.report_progress {
        transform.progress(0)?;
    }

    let entity = build_entity(&transform, config)?;
    transform.push_entity(entity);

    println!("{}", transform.to_xml()?);

    if config.transform.report_progress {
        transform.progress(100)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let config = Config::load()?;

    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("RUST_LOG", &config.transform.log_level),
    )
    .init();

    if let Err(e) = run(&config) {
        // Surface the failure in Maltego's output window before exiting non-zero
        signal::debug(&format!("Transform failed: {:#}", e));
        return Err(e);
    }

    Ok(())
}
