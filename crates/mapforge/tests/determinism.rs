mod common;

use common::{generate, string};
use mapforge::{config::MapperConfig, schema::prelude::*};
use proptest::prelude::*;

fn schema(order: &[usize], properties: usize) -> Schema {
    let types: Vec<TypeDescriptor> = (0..3)
        .flat_map(|i| {
            let mut source = TypeDescriptor::new(format!("model::Item{i}")).maps_to(format!("dto::Item{i}Dto"));
            let mut destination = TypeDescriptor::new(format!("dto::Item{i}Dto"));
            for p in 0..properties {
                source = source.with_property(string(&format!("field_{p}")));
                destination = destination.with_property(string(&format!("field_{p}")));
            }
            [source, destination]
        })
        .collect();

    let mut schema = Schema::new();
    for &index in order {
        schema.insert_type(types[index].clone());
    }

    schema
}

fn config(sequence: bool, expression: bool, hook: bool) -> MapperConfig {
    MapperConfig {
        generate_sequence_variant: sequence,
        generate_expression_variant: expression,
        generate_after_hook: hook,
        generate_registration: true,
        generate_dispatch: true,
        ..Default::default()
    }
}

proptest! {
    #[test]
    fn output_ignores_declaration_order(
        order in Just((0..6).collect::<Vec<usize>>()).prop_shuffle(),
        properties in 1usize..5,
        sequence in any::<bool>(),
        expression in any::<bool>(),
        hook in any::<bool>(),
    ) {
        let config = config(sequence, expression, hook);
        let baseline = generate(&schema(&[0, 1, 2, 3, 4, 5], properties), &config);
        let shuffled = generate(&schema(&order, properties), &config);

        prop_assert_eq!(baseline.artifacts, shuffled.artifacts);
    }

    #[test]
    fn repeated_generation_is_byte_identical(properties in 1usize..5, expression in any::<bool>()) {
        let schema = schema(&[0, 1, 2, 3, 4, 5], properties);
        let config = config(true, expression, true);

        let first = generate(&schema, &config).combined();
        let second = generate(&schema, &config).combined();

        prop_assert_eq!(first, second);
    }
}
