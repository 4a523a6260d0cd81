use sea_orm_migration::prelude::*;

/// Many-to-many link table: composite primary key, cascading foreign keys to both sides.
pub(crate) fn join_table(
    table: impl IntoIden,
    left: (impl IntoIden, impl IntoIden),
    right: (impl IntoIden, impl IntoIden),
) -> TableCreateStatement {
    let table: DynIden = table.into_iden();
    let (left_col, left_table): (DynIden, DynIden) = (left.0.into_iden(), left.1.into_iden());
    let (right_col, right_table): (DynIden, DynIden) = (right.0.into_iden(), right.1.into_iden());

    let fk_name = |col: &DynIden| format!("fk_{}_{}", Iden::to_string(&*table), Iden::to_string(&**col));

    Table::create()
        .table(table.clone())
        .if_not_exists()
        .col(ColumnDef::new(left_col.clone()).string().not_null())
        .col(ColumnDef::new(right_col.clone()).string().not_null())
        .primary_key(Index::create().col(left_col.clone()).col(right_col.clone()))
        .foreign_key(
            ForeignKey::create()
                .name(fk_name(&left_col))
                .from(table.clone(), left_col.clone())
                .to(left_table, Alias::new("id"))
                .on_delete(ForeignKeyAction::Cascade)
                .on_update(ForeignKeyAction::Cascade),
        )
        .foreign_key(
            ForeignKey::create()
                .name(fk_name(&right_col))
                .from(table.clone(), right_col.clone())
                .to(right_table, Alias::new("id"))
                .on_delete(ForeignKeyAction::Cascade)
                .on_update(ForeignKeyAction::Cascade),
        )
        .to_owned()
}
