pub fn handle(resource_type: Option<&str>) -> anyhow::Result<()> {
    let schemas = octoform_provider::resource_schemas();

    let output = match resource_type {
        Some(resource_type) => {
            let schema = schemas
                .get(resource_type)
                .ok_or_else(|| anyhow::anyhow!("Resource type not supported: {}", resource_type))?;
            serde_json::to_string_pretty(schema)?
        }
        None => serde_json::to_string_pretty(&schemas)?,
    };

    println!("{}", output);
    Ok(())
}
