use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_products_table::Migration),
            Box::new(m20240301_000002_create_option_tables::Migration),
            Box::new(m20240301_000003_create_product_variants_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240301_000001_create_products_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_products_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Products::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(
                            ColumnDef::new(Products::Price)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Products::Stock).integer().null())
                        .col(
                            ColumnDef::new(Products::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Products::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Products::UpdatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Products {
        Table,
        Id,
        Name,
        Price,
        Stock,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000002_create_option_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_option_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ProductOptions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductOptions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductOptions::ProductId).uuid().not_null())
                        .col(ColumnDef::new(ProductOptions::Name).string().not_null())
                        .col(
                            ColumnDef::new(ProductOptions::Position)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ProductOptions::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductOptions::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_product_options_product")
                                .from(ProductOptions::Table, ProductOptions::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("ix_product_options_product")
                        .table(ProductOptions::Table)
                        .col(ProductOptions::ProductId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ProductOptionValues::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductOptionValues::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductOptionValues::OptionId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductOptionValues::Value)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductOptionValues::SwatchHex)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ProductOptionValues::Position)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ProductOptionValues::Visible)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(ProductOptionValues::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductOptionValues::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_product_option_values_option")
                                .from(ProductOptionValues::Table, ProductOptionValues::OptionId)
                                .to(ProductOptions::Table, ProductOptions::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("ix_product_option_values_option")
                        .table(ProductOptionValues::Table)
                        .col(ProductOptionValues::OptionId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProductOptionValues::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ProductOptions::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Products {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum ProductOptions {
        Table,
        Id,
        ProductId,
        Name,
        Position,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum ProductOptionValues {
        Table,
        Id,
        OptionId,
        Value,
        SwatchHex,
        Position,
        Visible,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000003_create_product_variants_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_product_variants_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ProductVariants::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductVariants::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductVariants::ProductId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductVariants::Price).decimal().null())
                        .col(ColumnDef::new(ProductVariants::Stock).integer().null())
                        .col(
                            ColumnDef::new(ProductVariants::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(ProductVariants::OptionValueIds)
                                .json()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductVariants::CombinationKey)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductVariants::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductVariants::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_product_variants_product")
                                .from(ProductVariants::Table, ProductVariants::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            // The combination-key invariant: one variant per value set per
            // product, enforced where concurrent generators meet.
            manager
                .create_index(
                    Index::create()
                        .name("ux_product_variants_combination")
                        .table(ProductVariants::Table)
                        .col(ProductVariants::ProductId)
                        .col(ProductVariants::CombinationKey)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProductVariants::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Products {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum ProductVariants {
        Table,
        Id,
        ProductId,
        Price,
        Stock,
        IsActive,
        OptionValueIds,
        CombinationKey,
        CreatedAt,
        UpdatedAt,
    }
}
