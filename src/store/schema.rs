// Table layout shared with the rest of the shop's tooling.
// Only created here when `database.create_schema` is set.

pub const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS Owners (
    Id        INTEGER PRIMARY KEY AUTOINCREMENT,
    Name      TEXT NOT NULL,
    Address   TEXT NOT NULL,
    Email     TEXT NOT NULL,
    Telephone TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS BikeTypes (
    Id   INTEGER PRIMARY KEY AUTOINCREMENT,
    Name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS Bikes (
    Id         INTEGER PRIMARY KEY AUTOINCREMENT,
    Brand      TEXT NOT NULL,
    Color      TEXT NOT NULL,
    OwnerId    INTEGER NOT NULL REFERENCES Owners(Id),
    BikeTypeId INTEGER NOT NULL REFERENCES BikeTypes(Id)
);

CREATE TABLE IF NOT EXISTS WorkOrders (
    Id            INTEGER PRIMARY KEY AUTOINCREMENT,
    BikeId        INTEGER NOT NULL REFERENCES Bikes(Id),
    Description   TEXT NOT NULL,
    DateInitiated TEXT NOT NULL,
    DateCompleted TEXT,
    UserProfileId INTEGER
);

CREATE INDEX IF NOT EXISTS IX_WorkOrders_BikeId ON WorkOrders(BikeId);
";
